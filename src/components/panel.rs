use super::common::{AlertDialog, ConfirmDialog, Modal, TemplateInput};
use crate::utils::{
    append_marker, compose_prompt, format_elapsed, reconcile_selection, required_inputs,
    run_banner, validate_inputs, BackendClient, CancelFlag, ProfileStore, PromptLibrary, Settings,
    StreamEvent, Theme, ThinkRewriter, CANCELLED_MARKER, FINISHED_MARKER, INPUT1_MARKER,
    INPUT2_MARKER,
};
use dioxus::prelude::*;
use std::time::{Duration, Instant};

/// The main prompt panel: template selection and editing, the two input
/// fields, the send/cancel control and the streaming output view.
///
/// One request at a time: while a runner is in flight the send control
/// becomes the cancel control, so there is no second path into `Running`.
#[component]
pub fn Panel(
    theme: Signal<Theme>,
    mut settings: Signal<Settings>,
    mut templates: Signal<PromptLibrary>,
    profiles: Signal<ProfileStore>,
) -> Element {
    let _ = theme.read();

    let mut selected_template = use_signal(|| None::<String>);
    let mut template_body = use_signal(String::new);
    let mut selected_profile = use_signal(|| None::<String>);
    let mut input1 = use_signal(String::new);
    let mut input2 = use_signal(String::new);
    let mut output = use_signal(String::new);
    let mut is_running = use_signal(|| false);
    let mut elapsed_secs = use_signal(|| 0.0f64);
    let mut run_generation = use_signal(|| 0usize);
    let mut cancel_flag = use_signal(|| None::<CancelFlag>);
    let mut alert = use_signal(|| None::<String>);

    let mut new_template_open = use_signal(|| false);
    let mut new_template_title = use_signal(String::new);
    let mut new_template_body = use_signal(String::new);
    let mut delete_confirm_open = use_signal(|| false);

    // Keep the template selector valid across reloads and deletes. The
    // selection is peeked, not read, so this only re-runs on store changes.
    use_effect(move || {
        let titles = templates.read().titles();
        let current = selected_template.peek().clone();
        let next = reconcile_selection(&titles, current.as_deref());
        if next != current {
            let body = next
                .as_deref()
                .and_then(|title| templates.peek().get(title).map(|t| t.body.clone()))
                .unwrap_or_default();
            selected_template.set(next);
            template_body.set(body);
        }
    });

    // Same for the profile selector.
    use_effect(move || {
        let names = profiles.read().names();
        let current = selected_profile.peek().clone();
        let next = reconcile_selection(&names, current.as_deref());
        if next != current {
            selected_profile.set(next);
        }
    });

    let on_template_change = move |evt: FormEvent| {
        let title = evt.value();
        if title.is_empty() {
            selected_template.set(None);
            template_body.set(String::new());
            return;
        }
        let body = templates
            .read()
            .get(&title)
            .map(|t| t.body.clone())
            .unwrap_or_default();
        selected_template.set(Some(title));
        template_body.set(body);
    };

    let on_profile_change = move |evt: FormEvent| {
        let name = evt.value();
        selected_profile.set(if name.is_empty() { None } else { Some(name) });
    };

    let on_cap_change = move |evt: FormEvent| {
        if let Ok(cap) = evt.value().trim().parse::<usize>() {
            let mut current = settings.write();
            current.max_input_chars = cap;
            if let Err(e) = current.save() {
                eprintln!("failed to save settings: {}", e);
            }
        }
    };

    let save_template = move |_| {
        let Some(title) = selected_template.read().clone() else {
            return;
        };
        let body = template_body.read().clone();
        if body.trim().is_empty() {
            alert.set(Some("the template body is empty".to_string()));
            return;
        }

        let mut library = templates.read().clone();
        library.upsert(title, body);
        match library.save().and_then(|_| PromptLibrary::load()) {
            Ok(fresh) => templates.set(fresh),
            Err(e) => alert.set(Some(e)),
        }
    };

    let create_template = move |_| {
        let title = new_template_title.read().trim().to_string();
        let body = new_template_body.read().clone();
        if title.is_empty() || body.trim().is_empty() {
            alert.set(Some("a new template needs both a title and a body".to_string()));
            return;
        }

        let mut library = templates.read().clone();
        library.upsert(title.clone(), body);
        match library.save().and_then(|_| PromptLibrary::load()) {
            Ok(fresh) => {
                let saved_body = fresh
                    .get(&title)
                    .map(|t| t.body.clone())
                    .unwrap_or_default();
                templates.set(fresh);
                selected_template.set(Some(title));
                template_body.set(saved_body);
                new_template_open.set(false);
                new_template_title.set(String::new());
                new_template_body.set(String::new());
            }
            Err(e) => alert.set(Some(e)),
        }
    };

    let delete_template = move |_| {
        let Some(title) = selected_template.read().clone() else {
            return;
        };

        let mut library = templates.read().clone();
        library.remove(&title);
        match library.save().and_then(|_| PromptLibrary::load()) {
            // The reconcile effect moves the selection to a surviving entry.
            Ok(fresh) => templates.set(fresh),
            Err(e) => alert.set(Some(e)),
        }
    };

    let refresh_templates = move |_| match PromptLibrary::load() {
        Ok(fresh) => templates.set(fresh),
        Err(e) => alert.set(Some(e)),
    };

    let toggle_run = move |_| {
        if *is_running.read() {
            // Running -> Idle (user cancel). The runner observes the flag
            // between reads and drops the connection; rendered chunks stay.
            if let Some(flag) = cancel_flag.read().clone() {
                flag.cancel();
            }
            cancel_flag.set(None);
            is_running.set(false);
            append_marker(&mut output.write(), CANCELLED_MARKER);
            return;
        }

        let body = template_body.read().clone();
        if body.trim().is_empty() {
            alert.set(Some("select or write a prompt template first".to_string()));
            return;
        }

        let required = required_inputs(&body);
        if let Err(message) = validate_inputs(required, &input1.read(), &input2.read()) {
            alert.set(Some(message));
            return;
        }

        let Some(profile) = selected_profile
            .read()
            .as_deref()
            .and_then(|name| profiles.read().resolve(name))
        else {
            alert.set(Some("select a backend profile first".to_string()));
            return;
        };

        let max_chars = settings.read().max_input_chars;
        let prompt = compose_prompt(&body, &input1.read(), &input2.read(), max_chars);
        let template_title = selected_template.read().clone().unwrap_or_default();

        // Idle -> Running.
        output.set(run_banner(&profile, &template_title, max_chars));
        elapsed_secs.set(0.0);
        is_running.set(true);
        let generation = *run_generation.read() + 1;
        run_generation.set(generation);

        let flag = CancelFlag::new();
        cancel_flag.set(Some(flag.clone()));

        let (tx, rx) = async_channel::unbounded::<StreamEvent>();

        // Runner: the only place network I/O happens. Every outcome crosses
        // back over the channel; the terminal event is always last.
        let runner_flag = flag.clone();
        spawn(async move {
            match BackendClient::new(profile.timeout()) {
                Ok(client) => client.run_stream(&profile, &prompt, runner_flag, tx).await,
                Err(e) => {
                    let _ = tx.send(StreamEvent::Error(e)).await;
                }
            }
        });

        // Consumer: drains the queue in order and appends to the view.
        let consumer_flag = flag.clone();
        spawn(async move {
            let mut rewriter = ThinkRewriter::new();
            while let Ok(event) = rx.recv().await {
                if consumer_flag.is_cancelled() {
                    break;
                }
                match event {
                    StreamEvent::Content(chunk) => {
                        let visible = rewriter.push(&chunk);
                        if !visible.is_empty() {
                            output.write().push_str(&visible);
                        }
                    }
                    StreamEvent::Done => {
                        let rest = rewriter.finish();
                        if !rest.is_empty() {
                            output.write().push_str(&rest);
                        }
                        append_marker(&mut output.write(), FINISHED_MARKER);
                        is_running.set(false);
                        cancel_flag.set(None);
                        break;
                    }
                    StreamEvent::Error(message) => {
                        append_marker(&mut output.write(), &format!("[error] {}", message));
                        is_running.set(false);
                        cancel_flag.set(None);
                        break;
                    }
                }
            }
        });

        // Elapsed ticker while the request is in flight. The generation
        // check keeps a stale ticker from outliving its own run.
        spawn(async move {
            let started = Instant::now();
            loop {
                tokio::time::sleep(Duration::from_millis(100)).await;
                if !*is_running.read() || *run_generation.read() != generation {
                    break;
                }
                elapsed_secs.set(started.elapsed().as_secs_f64());
            }
        });
    };

    let required = required_inputs(&template_body.read());
    let running = *is_running.read();
    let elapsed_val = *elapsed_secs.read();
    let send_label = if running {
        format!("Cancel ({})", format_elapsed(elapsed_val))
    } else {
        "Send".to_string()
    };
    let has_selection = selected_template.read().is_some();
    let selected_title = selected_template.read().clone().unwrap_or_default();
    let delete_message = format!("Delete the template \"{}\"?", selected_title);
    let cap_value = settings.read().max_input_chars;

    rsx! {
        div {
            class: "flex flex-col h-full max-w-5xl mx-auto w-full p-4 gap-4",

            // Template selection and editing
            div {
                class: "flex flex-col gap-2",

                div {
                    class: "flex items-center gap-2",

                    label {
                        class: "text-sm font-semibold text-[var(--color-base-content)]",
                        "Template"
                    }
                    select {
                        value: "{selected_title}",
                        onchange: on_template_change,
                        class: "flex-1 px-3 py-2 rounded-lg bg-[var(--color-base-100)] text-[var(--color-base-content)] border-2 border-[var(--color-base-300)] focus:outline-none focus:ring-2 focus:ring-[var(--color-primary)] text-sm",

                        if templates.read().is_empty() {
                            option { value: "", "No templates saved" }
                        }
                        for title in templates.read().titles() {
                            option {
                                key: "{title}",
                                value: "{title}",
                                selected: selected_template.read().as_deref() == Some(title.as_str()),
                                "{title}"
                            }
                        }
                    }

                    button {
                        onclick: move |_| new_template_open.set(true),
                        class: "px-3 py-2 text-sm rounded border border-[var(--color-base-300)] bg-[var(--color-base-200)] text-[var(--color-base-content)] hover:bg-[var(--color-base-300)] transition-colors",
                        "New"
                    }
                    button {
                        onclick: save_template,
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
                        onclick: refresh_templates,
                        class: "px-3 py-2 text-sm rounded border border-[var(--color-base-300)] bg-[var(--color-base-200)] text-[var(--color-base-content)] hover:bg-[var(--color-base-300)] transition-colors",
                        "Refresh"
                    }
                }

                textarea {
                    value: "{template_body}",
                    oninput: move |evt| template_body.set(evt.value()),
                    rows: "5",
                    placeholder: "Template body. Use {INPUT1_MARKER} and {INPUT2_MARKER} where user text should go.",
                    class: "w-full p-3 border-2 rounded-lg font-mono text-sm bg-[var(--color-base-100)] text-[var(--color-base-content)] border-[var(--color-base-300)] focus:outline-none focus:ring-2 focus:ring-[var(--color-primary)] focus:border-transparent resize-y",
                }
            }

            // The two substitution inputs
            div {
                class: "flex gap-4",

                TemplateInput {
                    theme,
                    label: INPUT1_MARKER.to_string(),
                    value: input1,
                    enabled: required.first,
                }
                TemplateInput {
                    theme,
                    label: INPUT2_MARKER.to_string(),
                    value: input2,
                    enabled: required.second,
                }
            }

            // Profile, input cap, send control
            div {
                class: "flex items-center gap-2",

                label {
                    class: "text-sm font-semibold text-[var(--color-base-content)]",
                    "Profile"
                }
                select {
                    value: "{selected_profile.read().clone().unwrap_or_default()}",
                    onchange: on_profile_change,
                    class: "flex-1 px-3 py-2 rounded-lg bg-[var(--color-base-100)] text-[var(--color-base-content)] border-2 border-[var(--color-base-300)] focus:outline-none focus:ring-2 focus:ring-[var(--color-primary)] text-sm",

                    if profiles.read().is_empty() {
                        option { value: "", "No profiles configured" }
                    }
                    for name in profiles.read().names() {
                        option {
                            key: "{name}",
                            value: "{name}",
                            selected: selected_profile.read().as_deref() == Some(name.as_str()),
                            "{name}"
                        }
                    }
                }

                label {
                    class: "text-sm text-[var(--color-base-content)]/70",
                    "Input cap"
                }
                input {
                    r#type: "number",
                    value: "{cap_value}",
                    onchange: on_cap_change,
                    class: "w-24 px-3 py-2 rounded-lg bg-[var(--color-base-100)] text-[var(--color-base-content)] border-2 border-[var(--color-base-300)] focus:outline-none focus:ring-2 focus:ring-[var(--color-primary)] text-sm",
                }

                button {
                    onclick: toggle_run,
                    class: "px-5 py-2 text-sm rounded-lg font-medium transition-colors",
                    class: if running {
                        "bg-[var(--color-base-300)] text-[var(--color-base-content)] hover:bg-[var(--color-base-300)]/80"
                    } else {
                        "bg-[var(--color-primary)] text-[var(--color-primary-content)] hover:bg-[var(--color-primary)]/90"
                    },
                    "{send_label}"
                }
            }

            // Streaming output
            div {
                class: "flex-1 min-h-[200px] overflow-y-auto whitespace-pre-wrap break-words font-mono text-sm p-3 rounded-lg bg-[var(--color-base-200)] text-[var(--color-base-content)] border border-[var(--color-base-300)]",
                "{output}"
            }

            // New template modal
            Modal {
                theme,
                open: new_template_open,
                on_close: move |_| new_template_open.set(false),

                div {
                    class: "p-6",

                    h2 {
                        class: "text-xl font-bold text-[var(--color-base-content)] mb-4",
                        "New Template"
                    }

                    input {
                        value: "{new_template_title}",
                        oninput: move |evt| new_template_title.set(evt.value()),
                        placeholder: "Template title",
                        class: "w-full px-3 py-2 mb-3 rounded-lg bg-[var(--color-base-100)] text-[var(--color-base-content)] border-2 border-[var(--color-base-300)] focus:outline-none focus:ring-2 focus:ring-[var(--color-primary)] text-sm",
                        autofocus: true,
                    }

                    textarea {
                        value: "{new_template_body}",
                        oninput: move |evt| new_template_body.set(evt.value()),
                        rows: "8",
                        placeholder: "Template body...",
                        class: "w-full p-3 mb-4 border-2 rounded-lg font-mono text-sm bg-[var(--color-base-100)] text-[var(--color-base-content)] border-[var(--color-base-300)] focus:outline-none focus:ring-2 focus:ring-[var(--color-primary)] focus:border-transparent resize-y",
                    }

                    div {
                        class: "flex justify-end gap-2",
                        button {
                            onclick: move |_| new_template_open.set(false),
                            class: "px-4 py-2 text-sm rounded border border-[var(--color-base-300)] bg-[var(--color-base-200)] text-[var(--color-base-content)] hover:bg-[var(--color-base-300)] transition-colors",
                            "Cancel"
                        }
                        button {
                            onclick: create_template,
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
                title: "Delete Template".to_string(),
                message: delete_message,
                on_confirm: delete_template,
            }

            // Blocking error dialog (validation and file errors)
            AlertDialog { theme, message: alert }
        }
    }
}
