use crate::utils::Theme;
use dioxus::prelude::*;

#[component]
pub fn Modal(
    theme: Signal<Theme>,
    open: Signal<bool>,
    on_close: EventHandler<()>,
    children: Element,
) -> Element {
    let _ = theme.read();

    if !open() {
        return rsx! {};
    }

    rsx! {
        // Backdrop closes the dialog
        div {
            class: "fixed inset-0 bg-black/50 z-40 flex items-center justify-center p-4",
            onclick: move |_| on_close.call(()),

            // Clicks inside the dialog must not reach the backdrop
            div {
                class: "bg-[var(--color-base-100)] rounded-lg shadow-xl max-w-2xl w-full max-h-[90vh] overflow-auto relative",
                onclick: move |e| e.stop_propagation(),

                {children}
            }
        }
    }
}
