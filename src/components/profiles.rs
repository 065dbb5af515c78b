use super::common::{AlertDialog, ConfirmDialog, Modal};
use crate::utils::{reconcile_selection, ProfileEntry, ProfileStore, Theme};
use dioxus::prelude::*;

/// Backend profile manager: select a named profile, edit its connection
/// parameters, create, save, delete and refresh. Every mutation is written
/// to disk and the store reloaded wholesale.
#[component]
pub fn Profiles(theme: Signal<Theme>, mut profiles: Signal<ProfileStore>) -> Element {
    let _ = theme.read();

    let mut selected = use_signal(|| None::<String>);
    let mut endpoint = use_signal(String::new);
    let mut api_key = use_signal(String::new);
    let mut model = use_signal(String::new);
    let mut timeout_secs = use_signal(String::new);
    let mut alert = use_signal(|| None::<String>);

    let mut new_open = use_signal(|| false);
    let mut new_name = use_signal(String::new);
    let mut delete_confirm_open = use_signal(|| false);

    let mut load_fields = move |name: Option<&str>| {
        let entry = name.and_then(|n| profiles.read().entry(n).cloned());
        match entry {
            Some(entry) => {
                endpoint.set(entry.endpoint);
                api_key.set(entry.api_key);
                model.set(entry.model);
                timeout_secs.set(entry.timeout_secs.to_string());
            }
            None => {
                endpoint.set(String::new());
                api_key.set(String::new());
                model.set(String::new());
                timeout_secs.set(String::new());
            }
        }
    };

    // Keep the selector valid across reloads and populate the edit fields
    // when the selection moves.
    use_effect(move || {
        let names = profiles.read().names();
        let current = selected.peek().clone();
        let next = reconcile_selection(&names, current.as_deref());
        if next != current {
            load_fields(next.as_deref());
            selected.set(next);
        }
    });

    let on_profile_select = move |evt: FormEvent| {
        let name = evt.value();
        let next = if name.is_empty() { None } else { Some(name) };
        load_fields(next.as_deref());
        selected.set(next);
    };

    let save_profile = move |_| {
        let Some(name) = selected.read().clone() else {
            return;
        };
        let Ok(timeout) = timeout_secs.read().trim().parse::<u64>() else {
            alert.set(Some("timeout must be a whole number of seconds".to_string()));
            return;
        };

        let entry = ProfileEntry {
            endpoint: endpoint.read().trim().to_string(),
            api_key: api_key.read().trim().to_string(),
            model: model.read().trim().to_string(),
            timeout_secs: timeout,
        };
        if entry.endpoint.is_empty() || entry.model.is_empty() {
            alert.set(Some("a profile needs an endpoint and a model".to_string()));
            return;
        }

        let mut store = profiles.read().clone();
        store.upsert(name, entry);
        match store.save().and_then(|_| ProfileStore::load()) {
            // Selection is preserved; the fields already show what was saved.
            Ok(fresh) => profiles.set(fresh),
            Err(e) => alert.set(Some(e)),
        }
    };

    let create_profile = move |_| {
        let name = new_name.read().trim().to_string();
        if name.is_empty() {
            alert.set(Some("a new profile needs a name".to_string()));
            return;
        }

        let mut store = profiles.read().clone();
        store.upsert(name.clone(), ProfileEntry::default());
        match store.save().and_then(|_| ProfileStore::load()) {
            Ok(fresh) => {
                profiles.set(fresh);
                load_fields(Some(name.as_str()));
                selected.set(Some(name));
                new_open.set(false);
                new_name.set(String::new());
            }
            Err(e) => alert.set(Some(e)),
        }
    };

    let delete_profile = move |_| {
        let Some(name) = selected.read().clone() else {
            return;
        };

        let mut store = profiles.read().clone();
        store.remove(&name);
        match store.save().and_then(|_| ProfileStore::load()) {
            Ok(fresh) => {
                let next = reconcile_selection(&fresh.names(), None);
                profiles.set(fresh);
                load_fields(next.as_deref());
                selected.set(next);
            }
            Err(e) => alert.set(Some(e)),
        }
    };

    let refresh_profiles = move |_| match ProfileStore::load() {
        Ok(fresh) => {
            let next = reconcile_selection(&fresh.names(), selected.read().as_deref());
            profiles.set(fresh);
            load_fields(next.as_deref());
            selected.set(next);
        }
        Err(e) => alert.set(Some(e)),
    };

    let has_selection = selected.read().is_some();
    let selected_name = selected.read().clone().unwrap_or_default();
    let delete_message = format!("Delete the profile \"{}\"?", selected_name);

    rsx! {
        div {
            class: "flex flex-col max-w-3xl mx-auto w-full p-4 gap-4",

            div {
                class: "flex items-center gap-2",

                label {
                    class: "text-sm font-semibold text-[var(--color-base-content)]",
                    "Profile"
                }
                select {
                    value: "{selected_name}",
                    onchange: on_profile_select,
                    class: "flex-1 px-3 py-2 rounded-lg bg-[var(--color-base-100)] text-[var(--color-base-content)] border-2 border-[var(--color-base-300)] focus:outline-none focus:ring-2 focus:ring-[var(--color-primary)] text-sm",

                    if profiles.read().is_empty() {
                        option { value: "", "No profiles configured" }
                    }
                    for name in profiles.read().names() {
                        option {
                            key: "{name}",
                            value: "{name}",
                            selected: selected.read().as_deref() == Some(name.as_str()),
                            "{name}"
                        }
                    }
                }

                button {
                    onclick: move |_| new_open.set(true),
                    class: "px-3 py-2 text-sm rounded border border-[var(--color-base-300)] bg-[var(--color-base-200)] text-[var(--color-base-content)] hover:bg-[var(--color-base-300)] transition-colors",
                    "New"
                }
                button {
                    onclick: save_profile,
                    disabled: !has_selection,
                    class: "px-3 py-2 text-sm rounded border border-[var(--color-base-300)] bg-[var(--color-base-200)] text-[var(--color-base-content)] hover:bg-[var(--color-base-300)] transition-colors disabled:opacity-50",
                    "Save"
                }
                button {
                    onclick: move |_| delete_confirm_open.set(true),
                    disabled: !has_selection,
                    class: "px-3 py-2 text-sm rounded border border-[var(--color-base-300)] bg-[var(--color-base-200)] text-[var(--color-base-content)] hover:bg-[var(--color-base-300)] transition-colors disabled:opacity-50",
                    "Delete"
                }
                button {
                    onclick: refresh_profiles,
                    class: "px-3 py-2 text-sm rounded border border-[var(--color-base-300)] bg-[var(--color-base-200)] text-[var(--color-base-content)] hover:bg-[var(--color-base-300)] transition-colors",
                    "Refresh"
                }
            }

            div {
                class: "bg-[var(--color-base-200)] rounded-lg p-6 border border-[var(--color-base-300)] flex flex-col gap-3",

                div {
                    class: "flex flex-col gap-1",
                    label {
                        class: "text-sm font-semibold text-[var(--color-base-content)]",
                        "Endpoint"
                    }
                    input {
                        value: "{endpoint}",
                        oninput: move |evt| endpoint.set(evt.value()),
                        disabled: !has_selection,
                        placeholder: "http://localhost:11434/api/generate",
                        class: "w-full px-3 py-2 rounded-lg bg-[var(--color-base-100)] text-[var(--color-base-content)] border-2 border-[var(--color-base-300)] focus:outline-none focus:ring-2 focus:ring-[var(--color-primary)] text-sm disabled:opacity-50",
                    }
                }

                div {
                    class: "flex flex-col gap-1",
                    label {
                        class: "text-sm font-semibold text-[var(--color-base-content)]",
                        "API key"
                    }
                    input {
                        r#type: "password",
                        value: "{api_key}",
                        oninput: move |evt| api_key.set(evt.value()),
                        disabled: !has_selection,
                        placeholder: "Leave empty for a local generate backend",
                        class: "w-full px-3 py-2 rounded-lg bg-[var(--color-base-100)] text-[var(--color-base-content)] border-2 border-[var(--color-base-300)] focus:outline-none focus:ring-2 focus:ring-[var(--color-primary)] text-sm disabled:opacity-50",
                    }
                    p {
                        class: "text-xs text-[var(--color-base-content)]/60",
                        "With a key the endpoint is called as an OpenAI-compatible chat API; without one it is called as an Ollama-style generate server."
                    }
                }

                div {
                    class: "flex gap-3",

                    div {
                        class: "flex flex-col gap-1 flex-1",
                        label {
                            class: "text-sm font-semibold text-[var(--color-base-content)]",
                            "Model"
                        }
                        input {
                            value: "{model}",
                            oninput: move |evt| model.set(evt.value()),
                            disabled: !has_selection,
                            placeholder: "deepseek-r1:1.5b",
                            class: "w-full px-3 py-2 rounded-lg bg-[var(--color-base-100)] text-[var(--color-base-content)] border-2 border-[var(--color-base-300)] focus:outline-none focus:ring-2 focus:ring-[var(--color-primary)] text-sm disabled:opacity-50",
                        }
                    }

                    div {
                        class: "flex flex-col gap-1 w-32",
                        label {
                            class: "text-sm font-semibold text-[var(--color-base-content)]",
                            "Timeout (s)"
                        }
                        input {
                            r#type: "number",
                            value: "{timeout_secs}",
                            oninput: move |evt| timeout_secs.set(evt.value()),
                            disabled: !has_selection,
                            class: "w-full px-3 py-2 rounded-lg bg-[var(--color-base-100)] text-[var(--color-base-content)] border-2 border-[var(--color-base-300)] focus:outline-none focus:ring-2 focus:ring-[var(--color-primary)] text-sm disabled:opacity-50",
                        }
                    }
                }
            }

            // New profile modal
            Modal {
                theme,
                open: new_open,
                on_close: move |_| new_open.set(false),

                div {
                    class: "p-6",

                    h2 {
                        class: "text-xl font-bold text-[var(--color-base-content)] mb-4",
                        "New Profile"
                    }

                    input {
                        value: "{new_name}",
                        oninput: move |evt| new_name.set(evt.value()),
                        placeholder: "Profile name",
                        class: "w-full px-3 py-2 mb-4 rounded-lg bg-[var(--color-base-100)] text-[var(--color-base-content)] border-2 border-[var(--color-base-300)] focus:outline-none focus:ring-2 focus:ring-[var(--color-primary)] text-sm",
                        autofocus: true,
                    }

                    div {
                        class: "flex justify-end gap-2",
                        button {
                            onclick: move |_| new_open.set(false),
                            class: "px-4 py-2 text-sm rounded border border-[var(--color-base-300)] bg-[var(--color-base-200)] text-[var(--color-base-content)] hover:bg-[var(--color-base-300)] transition-colors",
                            "Cancel"
                        }
                        button {
                            onclick: create_profile,
                            class: "px-4 py-2 text-sm rounded bg-[var(--color-primary)] text-[var(--color-primary-content)] hover:bg-[var(--color-primary)]/90 transition-colors font-medium",
                            "Create"
                        }
                    }
                }
            }

            // Delete confirmation
            ConfirmDialog {
                theme,
                open: delete_confirm_open,
                title: "Delete Profile".to_string(),
                message: delete_message,
                on_confirm: delete_profile,
            }

            AlertDialog { theme, message: alert }
        }
    }
}
