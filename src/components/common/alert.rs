use crate::utils::Theme;
use dioxus::prelude::*;

/// Blocking error dialog. Shown whenever `message` holds a value; dismissing
/// clears it.
#[component]
pub fn AlertDialog(theme: Signal<Theme>, mut message: Signal<Option<String>>) -> Element {
    let _ = theme.read();

    let Some(text) = message.read().clone() else {
        return rsx! {};
    };

    rsx! {
        div {
            class: "fixed inset-0 bg-black/50 z-50 flex items-center justify-center p-4",
            onclick: move |_| message.set(None),

            div {
                class: "bg-[var(--color-base-100)] rounded-lg shadow-xl max-w-md w-full relative",
                onclick: move |e| e.stop_propagation(),

                div {
                    class: "p-6",

                    h2 {
                        class: "text-lg font-bold text-[var(--color-base-content)] mb-2",
                        "Error"
                    }
                    p {
                        class: "text-sm text-[var(--color-base-content)]/80 whitespace-pre-wrap mb-4",
                        "{text}"
                    }
                    div {
                        class: "flex justify-end",
                        button {
                            onclick: move |_| message.set(None),
                            class: "px-4 py-2 text-sm rounded bg-[var(--color-primary)] text-[var(--color-primary-content)] hover:bg-[var(--color-primary)]/90 transition-colors font-medium",
                            "OK"
                        }
                    }
                }
            }
        }
    }
}
