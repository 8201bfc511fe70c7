use leptos::prelude::*;
use portal_core::format::format_date;
use portal_core::resources::{PasswordChange, ProfileUpdate};

use crate::api;
use crate::components::fields::TextField;
use crate::state::{spawn_save, PortalState};

#[component]
pub fn SettingsPage() -> impl IntoView {
    let state = expect_context::<PortalState>();
    let form = RwSignal::new(ProfileUpdate::default());
    let password = RwSignal::new(PasswordChange::default());
    let saving_profile = RwSignal::new(false);
    let saving_password = RwSignal::new(false);

    // Seed the form whenever a fresh profile arrives.
    Effect::new(move |_| {
        if let Some(user) = state.profile.with(|p| p.profile().cloned()) {
            form.set(ProfileUpdate::from_user(&user));
        }
    });

    let profile = move || state.profile.with(|p| p.profile().cloned());

    let save_profile = move |_| {
        let update = form.get();
        spawn_save(
            state,
            saving_profile,
            async move {
                let client = api::client()?;
                let mut profile = state.profile.get_untracked();
                profile.update(&client, &update).await?;
                Ok(profile)
            },
            move |profile| {
                state.profile.set(profile);
                state.sync_session();
                state.success("Profile updated successfully");
            },
        );
    };

    let save_password = move |_| {
        let change = password.get();
        spawn_save(
            state,
            saving_password,
            async move {
                let client = api::client()?;
                state
                    .profile
                    .get_untracked()
                    .change_password(&client, &change)
                    .await
            },
            move |()| {
                password.set(PasswordChange::default());
                state.success("Password changed successfully");
            },
        );
    };

    view! {
        <div class="page settings-page">
            <h2>"Settings"</h2>

            <section class="settings-section">
                <h3>"Account"</h3>
                {move || profile().map(|user| view! {
                    <dl class="account-info">
                        <dt>"Email"</dt>
                        <dd>{user.email.clone()}</dd>
                        <dt>"Role"</dt>
                        <dd>{user.user_role.label()}</dd>
                        <dt>"Member since"</dt>
                        <dd>{format_date(&user.created_at)}</dd>
                    </dl>
                })}
            </section>

            <section class="settings-section">
                <h3>"Profile"</h3>
                <TextField
                    label="First name"
                    value=Signal::derive(move || form.with(|f| f.first_name.clone()))
                    on_input=move |v| form.update(|f| f.first_name = v)
                />
                <TextField
                    label="Last name"
                    value=Signal::derive(move || form.with(|f| f.last_name.clone()))
                    on_input=move |v| form.update(|f| f.last_name = v)
                />
                <TextField
                    label="Father's name"
                    value=Signal::derive(move || form.with(|f| f.father_name.clone().unwrap_or_default()))
                    on_input=move |v| form.update(|f| f.father_name = Some(v))
                />
                <TextField
                    label="Phone number"
                    value=Signal::derive(move || form.with(|f| f.phone_number.clone().unwrap_or_default()))
                    on_input=move |v| form.update(|f| f.phone_number = Some(v))
                />
                <TextField
                    label="Date of birth"
                    kind="date"
                    value=Signal::derive(move || form.with(|f| f.date_of_birth.clone().unwrap_or_default()))
                    on_input=move |v| form.update(|f| f.date_of_birth = Some(v))
                />
                <button class="btn btn-primary" on:click=save_profile disabled=move || saving_profile.get()>
                    {move || if saving_profile.get() { "Saving..." } else { "Save Profile" }}
                </button>
            </section>

            <section class="settings-section">
                <h3>"Change Password"</h3>
                <TextField
                    label="Current password"
                    kind="password"
                    value=Signal::derive(move || password.with(|p| p.current_password.clone()))
                    on_input=move |v| password.update(|p| p.current_password = v)
                />
                <TextField
                    label="New password"
                    kind="password"
                    value=Signal::derive(move || password.with(|p| p.new_password.clone()))
                    on_input=move |v| password.update(|p| p.new_password = v)
                />
                <TextField
                    label="Confirm new password"
                    kind="password"
                    value=Signal::derive(move || password.with(|p| p.confirm_password.clone()))
                    on_input=move |v| password.update(|p| p.confirm_password = v)
                />
                <button class="btn btn-primary" on:click=save_password disabled=move || saving_password.get()>
                    {move || if saving_password.get() { "Changing..." } else { "Change Password" }}
                </button>
            </section>
        </div>
    }
}
