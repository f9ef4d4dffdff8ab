//! Page helpers for the club administration console
//!
//! Routes, visible labels and selectors live here so the helpers read as the
//! user journey they drive.

pub mod category_types;
pub mod login;
pub mod toast;

pub mod routes {
    pub const LOGIN: &str = "/#/auth/login";
    pub const DASHBOARD: &str = "/#/dashboard";
    pub const CATEGORY_TYPES: &str = "/#/category-type";
}

pub mod ui_text {
    pub const APP_TITLE: &str = "Qubika Club";
    pub const AUTHENTICATE: &str = "Autenticar";
    pub const DASHBOARD_LINK: &str = "Dashboard";
    pub const CATEGORY_TYPES_LINK: &str = "Tipos de Categorias";
    pub const ADD_CATEGORY: &str = "Adicionar";
    pub const CONFIRM: &str = "Aceptar";
    pub const SUCCESS_TOAST: &str = "Tipo de categoría adicionada satisfactoriamente";
}

pub mod selectors {
    pub const TOAST_MESSAGE: &str = "#toast-container .toast-message";
    pub const PAGINATION_ITEM: &str = ".page-item";
    pub const MODAL_CONTAINER: &str = "mat-dialog-container";

    pub const LOGIN_EMAIL_INPUT: &str = r#"input[formcontrolname="email"][type="email"]"#;
    pub const LOGIN_PASSWORD_INPUT: &str = r#"input[formcontrolname="password"][type="password"]"#;

    pub const CATEGORY_NAME_INPUT: &str = "#input-username";
    pub const SUB_CATEGORY_CHECKBOX: &str = "#customCheckMain";
    pub const PARENT_CATEGORY_INPUT: &str = r#"[formcontrolname="categoryId"] input[type="text"]"#;

    pub const TABLE_ROWS: &str = "tbody tr";
    pub const TABLE_CELLS: &str = "td";
    pub const TABLE_CELL_ANYWHERE: &str = "tbody tr td";
}

/// URL path fragment of the category creation endpoint
pub const CATEGORY_CREATE_PATH: &str = "/category-type/create";
