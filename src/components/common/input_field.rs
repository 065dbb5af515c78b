use crate::utils::Theme;
use dioxus::prelude::*;

/// One of the two template input fields: labeled textarea with a live
/// character counter. Disabled whenever the selected template body does not
/// carry the matching marker.
#[component]
pub fn TemplateInput(
    theme: Signal<Theme>,
    label: String,
    mut value: Signal<String>,
    enabled: bool,
) -> Element {
    let _ = theme.read();
    let count = value.read().chars().count();

    rsx! {
        div {
            class: "flex flex-col gap-1 flex-1 min-w-0",

            div {
                class: "flex items-center justify-between",
                label {
                    class: if enabled {
                        "text-sm font-semibold text-[var(--color-base-content)]"
                    } else {
                        "text-sm font-semibold text-[var(--color-base-content)]/40"
                    },
                    "{label}"
                }
                span {
                    class: "text-xs text-[var(--color-base-content)]/50",
                    "{count} chars"
                }
            }

            textarea {
                value: "{value}",
                oninput: move |evt| value.set(evt.value()),
                disabled: !enabled,
                rows: "4",
                placeholder: if enabled {
                    "Paste the text to substitute..."
                } else {
                    "Not used by the selected template"
                },
                class: "w-full p-3 border-2 rounded-lg text-sm bg-[var(--color-base-100)] text-[var(--color-base-content)] border-[var(--color-base-300)] focus:outline-none focus:ring-2 focus:ring-[var(--color-primary)] focus:border-transparent resize-y disabled:opacity-50 disabled:cursor-not-allowed",
            }
        }
    }
}
