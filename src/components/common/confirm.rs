use super::Modal;
use crate::utils::Theme;
use dioxus::prelude::*;

/// Yes/no confirmation built on `Modal`, used before destructive deletes.
#[component]
pub fn ConfirmDialog(
    theme: Signal<Theme>,
    mut open: Signal<bool>,
    title: String,
    message: String,
    on_confirm: EventHandler<()>,
) -> Element {
    let _ = theme.read();

    rsx! {
        Modal {
            theme,
            open,
            on_close: move |_| open.set(false),

            div {
                class: "p-6",

                h2 {
                    class: "text-lg font-bold text-[var(--color-base-content)] mb-2",
                    "{title}"
                }
                p {
                    class: "text-sm text-[var(--color-base-content)]/80 mb-4",
                    "{message}"
                }
                div {
                    class: "flex justify-end gap-2",
                    button {
                        onclick: move |_| open.set(false),
                        class: "px-4 py-2 text-sm rounded border border-[var(--color-base-300)] bg-[var(--color-base-200)] text-[var(--color-base-content)] hover:bg-[var(--color-base-300)] transition-colors",
                        "Cancel"
                    }
                    button {
                        onclick: move |_| {
                            on_confirm.call(());
                            open.set(false);
                        },
                        class: "px-4 py-2 text-sm rounded bg-[var(--color-error)] text-[var(--color-error-content)] hover:bg-[var(--color-error)]/90 transition-colors font-medium",
                        "Delete"
                    }
                }
            }
        }
    }
}
