use dioxus::prelude::*;

mod components;
mod utils;

use components::{Header, Panel, Profiles};
use utils::{AppView, ProfileStore, PromptLibrary, Settings, Theme, ThemeMode};

const TAILWIND_CSS: Asset = asset!("/assets/tailwind.css");

fn main() {
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    // Load settings from disk on startup
    let mut app_settings = use_signal(|| {
        Settings::load().unwrap_or_else(|e| {
            eprintln!("failed to load settings: {}", e);
            Settings::default()
        })
    });

    // Prompt templates and backend profiles, loaded wholesale at startup
    let templates = use_signal(|| {
        PromptLibrary::load().unwrap_or_else(|e| {
            eprintln!("failed to load prompt templates: {}", e);
            PromptLibrary::default()
        })
    });
    let profiles = use_signal(|| {
        ProfileStore::load().unwrap_or_else(|e| {
            eprintln!("failed to load backend profiles: {}", e);
            ProfileStore::default()
        })
    });

    // Theme state - load from settings
    let mut theme = use_signal(|| {
        let settings = app_settings.read();
        Theme::from_id(&settings.theme).unwrap_or(Theme::Dracula)
    });

    let mut current_view = use_signal(|| AppView::Panel);

    // Handler for toggling dark/light mode
    let toggle_mode = move |_| {
        let current_theme = *theme.read();
        let new_theme = if current_theme.is_dark() {
            Theme::Winter
        } else {
            Theme::Dracula
        };
        theme.set(new_theme);

        let mut settings = app_settings.write();
        settings.theme = new_theme.data_theme().to_string();
        settings.theme_mode = if new_theme.is_dark() {
            ThemeMode::Dark
        } else {
            ThemeMode::Light
        };
        let _ = settings.save();
    };

    // Handler for changing theme within mode
    let change_theme = move |new_theme: Theme| {
        theme.set(new_theme);

        let mut settings = app_settings.write();
        settings.theme = new_theme.data_theme().to_string();
        settings.theme_mode = if new_theme.is_dark() {
            ThemeMode::Dark
        } else {
            ThemeMode::Light
        };
        let _ = settings.save();
    };

    let change_view = move |view: AppView| {
        current_view.set(view);
    };

    let theme_val = *theme.read();
    let data_theme = theme_val.data_theme();

    rsx! {
        document::Link { rel: "stylesheet", href: TAILWIND_CSS }

        div {
            "data-theme": "{data_theme}",
            class: "font-sans antialiased bg-[var(--color-base-100)] text-[var(--color-base-content)]",

            div {
                class: "flex flex-col h-screen overflow-hidden",

                Header {
                    theme,
                    current_view,
                    on_view_change: change_view,
                    on_toggle_mode: toggle_mode,
                    on_theme_change: change_theme,
                }

                main {
                    class: "grow min-h-0 overflow-y-auto",

                    match *current_view.read() {
                        AppView::Panel => rsx! {
                            Panel {
                                theme,
                                settings: app_settings,
                                templates,
                                profiles,
                            }
                        },
                        AppView::Profiles => rsx! {
                            Profiles {
                                theme,
                                profiles,
                            }
                        },
                    }
                }
            }
        }
    }
}
