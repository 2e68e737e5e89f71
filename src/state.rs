use crate::{
    config::RuntimeConfiguration,
    data::{store::StudentStore, validation::Validator},
    maud_conveniences::{TOAST_SCRIPT, TOASTS_ID},
};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::{ops::Deref, sync::Arc};

//swap error responses too, so validation fragments and error alerts still render
const HTMX_CONFIG: &str =
    r#"{"responseHandling":[{"code":"204","swap":false},{"code":".*","swap":true}]}"#;

#[derive(Clone, Debug)]
pub struct RollcallState {
    store: Arc<StudentStore>,
    config: RuntimeConfiguration,
}

impl RollcallState {
    pub fn new(config: RuntimeConfiguration) -> Self {
        let validator = Validator::new(config.email_domain());
        let store = Arc::new(StudentStore::new(config.data_path(), validator));

        Self { store, config }
    }

    pub fn config(&self) -> &RuntimeConfiguration {
        &self.config
    }

    /// The domain used for generated addresses: the required one if any, otherwise a placeholder.
    pub fn sample_email_domain(&self) -> &str {
        self.validator()
            .required_email_domain()
            .unwrap_or("example.com")
    }

    #[allow(clippy::unused_self)] //in case self is ever needed :)
    pub fn render(&self, markup: Markup) -> Markup {
        html! {
            (DOCTYPE)
            html {
                head {
                    meta charset="UTF-8" {}
                    meta name="viewport" content="width=device-width, initial-scale=1.0" {}
                    meta name="htmx-config" content=(HTMX_CONFIG) {}
                    script src="https://unpkg.com/htmx.org@2.0.4" integrity="sha384-HGfztofotfshcF7+8n44JQL2oJmowVChPTg48S+jvZoztPfvwD79OC/LTtG6dMp+" crossorigin="anonymous" {}
                    script src="https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4" {}
                    title { "Rollcall" }
                }
                body class="bg-gray-900 min-h-screen flex flex-col items-center text-white p-8" {
                    nav class="w-full max-w-6xl flex flex-row space-x-4 mb-8" {
                        a href="/" class="font-bold text-xl mr-auto" {"Rollcall"}
                        a href="/app" class="hover:text-blue-400" {"Dashboard"}
                        a href="/import_export" class="hover:text-blue-400" {"Import / Export"}
                    }
                    (markup)
                    div id=(TOASTS_ID) class="fixed bottom-4 right-4 flex flex-col space-y-2" {}
                    script { (PreEscaped(TOAST_SCRIPT)) }
                }
            }
        }
    }
}

impl Deref for RollcallState {
    type Target = StudentStore;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}
