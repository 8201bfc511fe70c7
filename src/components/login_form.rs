use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::api;
use crate::state::PortalState;

#[component]
pub fn LoginForm() -> impl IntoView {
    let state = expect_context::<PortalState>();
    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (is_loading, set_is_loading) = signal(false);
    let (error_message, set_error_message) = signal::<Option<String>>(None);

    let submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let email = email.get();
        let password = password.get();
        set_is_loading.set(true);
        set_error_message.set(None);

        spawn_local(async move {
            let result = match api::client() {
                Ok(client) => client.login(&email, &password).await,
                Err(e) => Err(e),
            };
            match result {
                Ok(user) => {
                    set_password.set(String::new());
                    state.success(format!("Welcome back, {}!", user.first_name));
                    state.sync_session();
                }
                Err(e) => set_error_message.set(Some(e.user_message())),
            }
            set_is_loading.set(false);
        });
    };

    view! {
        <div class="login-panel">
            <h2>"Log In"</h2>
            <p class="section-description">"Sign in with your university account."</p>
            <form class="login-form" on:submit=submit>
                <div class="form-group">
                    <label for="login-email">"Email"</label>
                    <input
                        id="login-email"
                        type="email"
                        class="input"
                        prop:value=move || email.get()
                        on:input=move |ev| set_email.set(event_target_value(&ev))
                        disabled=move || is_loading.get()
                    />
                </div>
                <div class="form-group">
                    <label for="login-password">"Password"</label>
                    <input
                        id="login-password"
                        type="password"
                        class="input input-password"
                        prop:value=move || password.get()
                        on:input=move |ev| set_password.set(event_target_value(&ev))
                        disabled=move || is_loading.get()
                    />
                </div>
                <Show when=move || error_message.get().is_some()>
                    <p class="error-text">{move || error_message.get().unwrap_or_default()}</p>
                </Show>
                <button type="submit" class="btn btn-primary" disabled=move || is_loading.get()>
                    {move || if is_loading.get() { "Logging in..." } else { "Log In" }}
                </button>
            </form>
        </div>
    }
}
