//! Category types page: creation dialog, pagination and list checks

use regex::Regex;
use tracing::info;

use super::{selectors, ui_text, CATEGORY_CREATE_PATH};
use crate::error::E2eResult;
use crate::locator::{ClickOptions, Locator, Role};
use crate::model::CategoryType;
use crate::network::ResponseMatcher;
use crate::page::AppPage;

pub struct CategoryTypesLocators {
    pub category_types_link: Locator,
    pub add_button: Locator,
    pub modal: Locator,
    pub name_input: Locator,
    pub confirm_button: Locator,
    pub sub_category_checkbox: Locator,
    pub parent_dropdown_input: Locator,
    pub pagination_items: Locator,
}

impl CategoryTypesLocators {
    pub fn new(page: &AppPage) -> Self {
        Self {
            category_types_link: page.get_by_role(Role::Link, ui_text::CATEGORY_TYPES_LINK),
            add_button: page.get_by_role(Role::Button, ui_text::ADD_CATEGORY),
            modal: page.locator(selectors::MODAL_CONTAINER),
            name_input: page.locator(selectors::CATEGORY_NAME_INPUT),
            confirm_button: page.get_by_role(Role::Button, ui_text::CONFIRM),
            sub_category_checkbox: page.locator(selectors::SUB_CATEGORY_CHECKBOX),
            parent_dropdown_input: page.locator(selectors::PARENT_CATEGORY_INPUT),
            pagination_items: page.locator(selectors::PAGINATION_ITEM),
        }
    }
}

const FORCE: ClickOptions = ClickOptions { force: true };

pub async fn navigate_to_category_types_page(page: &AppPage) -> E2eResult<()> {
    let link = CategoryTypesLocators::new(page).category_types_link;

    link.expect().to_be_visible().await?;
    link.click().await?;

    page.expect().to_have_url(&Regex::new(r"/category-type")?).await?;
    link.expect().to_have_class(&Regex::new(r"active")?).await
}

/// The last numbered page button; the final item is "Next"
pub fn last_pagination_page_button(page: &AppPage) -> Locator {
    CategoryTypesLocators::new(page).pagination_items.nth(-2)
}

pub async fn go_to_last_pagination_page(page: &AppPage) -> E2eResult<()> {
    let last = last_pagination_page_button(page);
    last.expect().to_be_visible().await?;
    last.click().await
}

/// Open the add dialog and return the dialog container
pub async fn open_add_category_dialog(page: &AppPage) -> E2eResult<Locator> {
    let locators = CategoryTypesLocators::new(page);

    locators.add_button.expect().to_be_visible().await?;
    locators.add_button.click().await?;

    locators.modal.expect().to_be_visible().await?;
    Ok(locators.modal)
}

fn category_create_matcher() -> ResponseMatcher {
    ResponseMatcher::post(CATEGORY_CREATE_PATH)
}

/// Confirm the dialog and validate the creation response
async fn confirm_and_capture_creation(
    page: &AppPage,
    confirm: &Locator,
    name: &str,
    options: ClickOptions,
) -> E2eResult<CategoryType> {
    // Registered before the click so the response cannot be missed.
    let waiter = page.wait_for_response(category_create_matcher()).await?;

    confirm.expect().to_be_visible().await?;
    confirm.click_with(options).await?;

    let response = waiter.wait().await?;
    response.expect_status(200)?;

    let body: CategoryType = response.json()?;
    body.validate_created(name)?;
    info!("Created category type '{}' (id {})", body.name, body.id);
    Ok(body)
}

pub async fn create_root_category_via_ui(page: &AppPage, name: &str) -> E2eResult<CategoryType> {
    open_add_category_dialog(page).await?;
    let locators = CategoryTypesLocators::new(page);

    locators.name_input.expect().to_be_visible().await?;
    locators.name_input.fill(name).await?;

    confirm_and_capture_creation(page, &locators.confirm_button, name, ClickOptions::default())
        .await
}

pub async fn create_sub_category_via_ui(
    page: &AppPage,
    name: &str,
    parent_name: &str,
) -> E2eResult<CategoryType> {
    open_add_category_dialog(page).await?;
    let locators = CategoryTypesLocators::new(page);

    locators.name_input.expect().to_be_visible().await?;
    locators.name_input.fill(name).await?;

    // Styled checkbox: the native input is covered by its label.
    locators.sub_category_checkbox.expect().to_be_visible().await?;
    locators.sub_category_checkbox.click_with(FORCE).await?;

    locators.parent_dropdown_input.expect().to_be_visible().await?;
    locators.parent_dropdown_input.fill(parent_name).await?;
    locators.parent_dropdown_input.press("Enter").await?;

    confirm_and_capture_creation(page, &locators.confirm_button, name, FORCE).await
}

/// The row holding `name` shows `name` and `parent` in its first two columns
pub async fn expect_category_row_to_match_name_and_parent(
    page: &AppPage,
    name: &str,
    parent: &str,
) -> E2eResult<()> {
    // Match both values on one row so stale rows from other runs cannot pass.
    let row = page
        .locator(selectors::TABLE_ROWS)
        .filter_has(&page.locator(selectors::TABLE_CELLS).filter_has_text(name));

    row.expect().to_be_visible().await?;

    let cells = row.locator(selectors::TABLE_CELLS);
    cells.nth(0).expect().to_have_text(name).await?;
    cells.nth(1).expect().to_have_text(parent).await
}

pub async fn expect_category_name_to_be_visible_in_table(
    page: &AppPage,
    category_name: &str,
) -> E2eResult<()> {
    page.locator(selectors::TABLE_CELL_ANYWHERE)
        .filter_has_text(category_name)
        .expect()
        .to_be_visible()
        .await
}
