use crate::utils::{AppView, Theme};
use dioxus::prelude::*;

#[component]
pub fn Header(
    theme: Signal<Theme>,
    current_view: Signal<AppView>,
    on_view_change: EventHandler<AppView>,
    on_toggle_mode: EventHandler<()>,
    on_theme_change: EventHandler<Theme>,
) -> Element {
    let theme_val = *theme.read();
    let is_dark = theme_val.is_dark();
    let mut dropdown_open = use_signal(|| false);

    let available_themes = if is_dark {
        Theme::dark_themes()
    } else {
        Theme::light_themes()
    };

    rsx! {
        header {
            class: "sticky top-0 z-30 bg-[var(--color-base-200)] border-b border-[var(--color-base-300)]",

            div {
                class: "px-4 sm:px-6",

                div {
                    class: "flex items-center justify-between h-14",

                    // Left side - title and view tabs
                    div {
                        class: "flex items-center gap-4",

                        span {
                            class: "text-xl font-bold text-[var(--color-base-content)]",
                            "PromptDesk"
                        }

                        nav {
                            class: "flex items-center gap-1",

                            for view in [AppView::Panel, AppView::Profiles] {
                                button {
                                    key: "{view.name()}",
                                    onclick: move |_| on_view_change.call(view),
                                    class: "px-3 py-1.5 rounded-lg text-sm font-medium transition-colors",
                                    class: if *current_view.read() == view {
                                        "bg-[var(--color-primary)]/10 text-[var(--color-primary)]"
                                    } else {
                                        "text-[var(--color-base-content)]/70 hover:bg-[var(--color-base-300)]/50"
                                    },
                                    "{view.name()}"
                                }
                            }
                        }
                    }

                    // Right side - theme controls
                    div {
                        class: "flex items-center gap-3",

                        // Theme dropdown (custom)
                        div {
                            class: "relative",

                            button {
                                onclick: move |_| dropdown_open.set(!dropdown_open()),
                                class: "px-3 py-1.5 rounded-lg bg-[var(--color-base-300)] text-[var(--color-base-content)] text-sm font-medium border border-[var(--color-base-300)] hover:bg-[var(--color-base-300)]/80 focus:outline-none focus:ring-2 focus:ring-[var(--color-primary)] transition-all cursor-pointer flex items-center gap-2",
                                "{theme_val.name()}"
                                span {
                                    class: "text-[10px] opacity-50",
                                    if *dropdown_open.read() { "▲" } else { "▼" }
                                }
                            }

                            if *dropdown_open.read() {
                                div {
                                    class: "absolute right-0 mt-2 w-32 bg-[var(--color-base-200)] border border-[var(--color-base-300)] rounded-lg shadow-lg z-50 overflow-hidden",

                                    for available_theme in available_themes.iter() {
                                        {
                                            let theme_to_select = *available_theme;
                                            let is_selected = theme_to_select == theme_val;

                                            rsx! {
                                                button {
                                                    key: "{available_theme.data_theme()}",
                                                    onclick: move |_| {
                                                        on_theme_change.call(theme_to_select);
                                                        dropdown_open.set(false);
                                                    },
                                                    class: "w-full px-3 py-2 text-left text-sm hover:bg-[var(--color-base-300)] transition-colors",
                                                    class: if is_selected {
                                                        "bg-[var(--color-primary)]/10 text-[var(--color-base-content)] font-semibold"
                                                    } else {
                                                        "text-[var(--color-base-content)]"
                                                    },
                                                    "{available_theme.name()}"
                                                }
                                            }
                                        }
                                    }
                                }
                            }
                        }

                        // Dark/Light mode toggle
                        button {
                            onclick: move |_| on_toggle_mode.call(()),
                            class: "w-8 h-8 flex items-center justify-center hover:bg-[var(--color-base-300)]/50 rounded-full transition-colors",
                            title: if is_dark { "Switch to light mode" } else { "Switch to dark mode" },
                            if is_dark { "☀" } else { "🌙" }
                        }
                    }
                }
            }
        }
    }
}
