//! Login page

use regex::Regex;
use tracing::info;

use super::{routes, selectors, ui_text};
use crate::error::E2eResult;
use crate::fixtures::Credentials;
use crate::locator::{Locator, Role};
use crate::page::AppPage;

pub struct LoginLocators {
    pub authenticate_button: Locator,
    pub email_input: Locator,
    pub password_input: Locator,
    pub dashboard_link: Locator,
}

impl LoginLocators {
    pub fn new(page: &AppPage) -> Self {
        Self {
            authenticate_button: page.get_by_role(Role::Button, ui_text::AUTHENTICATE),
            email_input: page.locator(selectors::LOGIN_EMAIL_INPUT),
            password_input: page.locator(selectors::LOGIN_PASSWORD_INPUT),
            dashboard_link: page.get_by_role(Role::Link, ui_text::DASHBOARD_LINK),
        }
    }
}

/// Log in through the form and land on the dashboard
pub async fn login_via_ui(page: &AppPage, credentials: &Credentials) -> E2eResult<()> {
    let login = LoginLocators::new(page);
    info!("Logging in as {}", credentials.email);

    page.goto(routes::LOGIN).await?;

    page.expect().to_have_title(ui_text::APP_TITLE).await?;
    page.expect().to_have_url(&Regex::new(r"/auth/login")?).await?;
    login.authenticate_button.expect().to_be_visible().await?;

    login.email_input.expect().to_be_visible().await?;
    login.email_input.fill(&credentials.email).await?;

    login.password_input.expect().to_be_visible().await?;
    login.password_input.fill(&credentials.password).await?;

    login.authenticate_button.click().await?;

    page.expect().to_have_url(&Regex::new(r"/dashboard")?).await?;
    login.dashboard_link.expect().to_be_visible().await?;
    Ok(())
}
