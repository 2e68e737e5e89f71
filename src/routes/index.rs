use crate::state::RollcallState;
use axum::extract::State;
use maud::{Markup, html};

pub async fn get_index_route(State(state): State<RollcallState>) -> Markup {
    state.render(html! {
        div class="bg-gray-800 p-8 rounded shadow-md max-w-md w-full" {
            h1 class="text-2xl font-semibold mb-6 text-center" {
                "Rollcall"
            }
            p class="text-gray-300 mb-6 text-center" {
                "Keep track of your students: add, edit, filter and export records in one place."
            }

            div class="flex flex-row space-x-4 justify-center" {
                a href="/app" class="bg-slate-600 hover:bg-slate-800 font-bold py-2 px-4 rounded"  {
                    "Open Dashboard"
                }
                a href="/import_export" class="bg-slate-600 hover:bg-slate-800 font-bold py-2 px-4 rounded"  {
                    "Import / Export"
                }
            }
        }
    })
}
