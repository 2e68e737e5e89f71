use maud::{Escaper, Markup, PreEscaped, Render, html};
use std::fmt::Write;

pub const TOASTS_ID: &str = "toasts";

pub const TOAST_SCRIPT: &str = r"
htmx.onLoad(function (elt) {
    var toasts = elt.matches && elt.matches('[data-toast]') ? [elt] : elt.querySelectorAll('[data-toast]');
    toasts.forEach(function (toast) { setTimeout(function () { toast.remove(); }, 4000); });
});
";

const INPUT_CLASSES: &str = "shadow appearance-none border rounded w-full py-2 px-3 leading-tight focus:outline-none focus:shadow-outline bg-gray-700 border-gray-600";

pub fn render_table<const N: usize>(
    overall_title: impl Render,
    titles: [&'static str; N],
    items: Vec<[Markup; N]>,
) -> Markup {
    html! {
        div class="container mx-auto" {
            (overall_title)
            div class="overflow-x-auto" {
                table class="min-w-full bg-gray-800 rounded shadow-md" {
                    thead class="bg-gray-700" {
                        tr {
                            @for title in titles {
                                th class="py-2 px-4 text-left font-semibold text-gray-300" {(title)}
                            }
                        }
                    }
                    tbody {
                        @for row in items {
                            tr {
                                @for col in row {
                                    td class="py-2 px-4 border-b border-gray-600 text-gray-200" {(col)}
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

pub fn escape(s: impl AsRef<str>) -> PreEscaped<String> {
    let mut output = String::new();
    Escaper::new(&mut output).write_str(s.as_ref()).unwrap(); //this method always succeeds - strange api!
    PreEscaped(output)
}

pub fn title(s: impl Render) -> Markup {
    html! {
        h1 class="text-2xl font-semibold mb-4" {(s)}
    }
}

pub fn subsubtitle(s: impl Render) -> Markup {
    html! {
        h3 class="text-lg font-semibold mb-2" {(s)}
    }
}

pub fn form_element(
    id: &'static str,
    label: &'static str,
    element: Markup,
    error: Option<&str>,
) -> Markup {
    html! {
        div class="mb-4" {
            label for=(id) class="block text-sm font-bold mb-2 text-gray-300" {(label)}
            (element)
            @if let Some(error) = error {
                p class="text-red-400 text-xs italic mt-1" {(error)}
            }
        }
    }
}

pub fn simple_form_element(
    id: &'static str,
    label: &'static str,
    ty: Option<&'static str>,
    value: Option<&str>,
    error: Option<&str>,
) -> Markup {
    form_element(
        id,
        label,
        html! {
            input required type=(ty.unwrap_or("text")) id=(id) name=(id) value=[value] class=(INPUT_CLASSES) {}
        },
        error,
    )
}

pub fn select_element<'a>(
    id: &'static str,
    label: &'static str,
    placeholder: &'static str,
    options: impl IntoIterator<Item = &'a str>,
    selected: Option<&str>,
    error: Option<&str>,
) -> Markup {
    form_element(
        id,
        label,
        html! {
            select id=(id) name=(id) class=(INPUT_CLASSES) {
                option value="" {(placeholder)}
                @for choice in options {
                    option value=(choice) selected[selected == Some(choice)] {(choice)}
                }
            }
        },
        error,
    )
}

pub fn form_submit_button(text: Option<&str>) -> Markup {
    html! {
        div class="flex items-center justify-between" {
            button type="submit" class="bg-blue-500 hover:bg-blue-700 font-bold py-2 px-4 rounded focus:outline-none focus:shadow-outline" {
                (text.unwrap_or("Submit"))
            }
        }
    }
}

pub fn errors_list(title: Option<&str>, list: impl IntoIterator<Item = String>) -> Markup {
    html! {
        div class="bg-red-100 border border-red-400 text-red-700 px-4 py-3 rounded relative mb-4" role="alert" {
            @if let Some(title) = title {
                strong class="font-bold" {(title)}
            }
            ul class="list-disc list-inside" {
                @for item in list {
                    li {(item)}
                }
            }
        }
    }
}

pub fn stat_card(label: &'static str, value: usize) -> Markup {
    html! {
        div class="rounded-lg shadow-md p-4 text-center bg-gray-800" {
            p class="text-3xl font-bold" {(value)}
            p class="text-sm text-gray-400" {(label)}
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

/// Appended out-of-band to the page's toast container, and removed again client-side.
pub fn toast(message: impl Render, kind: ToastKind) -> Markup {
    let colours = match kind {
        ToastKind::Success => "bg-green-700",
        ToastKind::Error => "bg-red-700",
        ToastKind::Info => "bg-blue-700",
    };

    html! {
        div hx-swap-oob={"beforeend:#" (TOASTS_ID)} {
            div data-toast="1" class={"rounded shadow-lg px-4 py-2 " (colours)} {(message)}
        }
    }
}
