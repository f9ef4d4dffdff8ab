//! Success toast shown after a category type is created

use tracing::debug;

use super::{selectors, ui_text};
use crate::error::E2eResult;
use crate::locator::Locator;
use crate::page::AppPage;

pub fn success_toast(page: &AppPage) -> Locator {
    page.locator(selectors::TOAST_MESSAGE)
        .filter_has_text(ui_text::SUCCESS_TOAST)
}

/// The success toast shows, closes on its own, and leaves no node behind
pub async fn expect_success_toast_to_show_and_auto_dismiss(page: &AppPage) -> E2eResult<()> {
    let toast = success_toast(page);

    toast.expect().to_be_visible().await?;
    debug!("Success toast visible, waiting for auto-dismiss");

    toast
        .expect()
        .with_timeout(page.timeouts().toast_dismiss())
        .to_be_hidden()
        .await?;

    toast.expect().to_have_count(0).await
}
