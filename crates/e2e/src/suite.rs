//! The category types suite: API setup, UI journey, teardown

use tracing::info;

use crate::api::ApiContext;
use crate::config::SuiteConfig;
use crate::console::category_types::{
    create_root_category_via_ui, create_sub_category_via_ui,
    expect_category_name_to_be_visible_in_table, expect_category_row_to_match_name_and_parent,
    go_to_last_pagination_page, navigate_to_category_types_page,
};
use crate::console::login::login_via_ui;
use crate::console::toast::expect_success_toast_to_show_and_auto_dismiss;
use crate::error::E2eResult;
use crate::fixtures::SuiteFixtures;
use crate::model::RegisterUser;
use crate::page::AppPage;
use crate::runner::StepLog;

pub const SUITE_NAME: &str = "Category Types E2E (UI + API)";
pub const TEST_NAME: &str =
    "creates a root category and a sub-category, then validates them in the list";

/// Suite state shared by its tests, created once in `before_all`
pub struct CategoryTypesSuite {
    api: ApiContext,
    fixtures: SuiteFixtures,
    existing_root_category: String,
}

impl CategoryTypesSuite {
    /// Create the request context, generate fixtures and register an admin user
    pub async fn before_all(config: &SuiteConfig, preflight: bool) -> E2eResult<Self> {
        let api = ApiContext::new(config)?;

        if preflight {
            api.wait_until_reachable(&config.api_base_url, config.timeouts.navigation())
                .await?;
        }

        let fixtures = SuiteFixtures::generate(&config.email_domain);
        info!("Fixture suffix for this run: {}", fixtures.suffix);

        api.register_user(&RegisterUser::new(&fixtures.credentials, &config.user_roles))
            .await?;

        Ok(Self {
            api,
            fixtures,
            existing_root_category: config.existing_root_category.clone(),
        })
    }

    pub async fn creates_root_and_sub_category(
        &self,
        page: &AppPage,
        steps: &mut StepLog,
    ) -> E2eResult<()> {
        let fixtures = &self.fixtures;
        let root_name = fixtures.root_category_name.as_str();
        let sub_name = fixtures.sub_category_name.as_str();
        let parent = self.existing_root_category.as_str();

        steps
            .run("log in via UI", login_via_ui(page, &fixtures.credentials))
            .await?;
        steps
            .run("open category types", navigate_to_category_types_page(page))
            .await?;

        let created_root = steps
            .run("create root category", create_root_category_via_ui(page, root_name))
            .await?;
        steps
            .run("created category is root", async { created_root.expect_root() })
            .await?;
        steps
            .run(
                "root success toast auto-dismisses",
                expect_success_toast_to_show_and_auto_dismiss(page),
            )
            .await?;

        steps
            .run("go to last page", go_to_last_pagination_page(page))
            .await?;
        steps
            .run(
                "root category listed",
                expect_category_name_to_be_visible_in_table(page, root_name),
            )
            .await?;

        steps
            .run(
                "create sub-category",
                create_sub_category_via_ui(page, sub_name, parent),
            )
            .await?;
        steps
            .run(
                "sub-category success toast auto-dismisses",
                expect_success_toast_to_show_and_auto_dismiss(page),
            )
            .await?;

        steps
            .run("go to last page again", go_to_last_pagination_page(page))
            .await?;
        steps
            .run(
                "sub-category row shows parent",
                expect_category_row_to_match_name_and_parent(page, sub_name, parent),
            )
            .await?;

        Ok(())
    }

    /// Release the request context (connections, cookies)
    pub fn after_all(self) {
        self.api.dispose();
    }
}
