use leptos::prelude::*;
use portal_core::capabilities::{can, Capability};
use portal_core::format::format_date;
use portal_core::resources::{UserDraft, UserUpdate};
use portal_core::UserRole;

use crate::api;
use crate::components::fields::{CheckboxField, SelectField, TextField};
use crate::components::stat_card::StatCard;
use crate::state::{spawn_save, spawn_task, PortalState};

const ROLE_OPTIONS: [(&str, &str); 3] = [
    ("student", "Student"),
    ("professor", "Professor"),
    ("admin", "Admin"),
];

fn blank_to_none(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn to_update(draft: &UserDraft) -> UserUpdate {
    UserUpdate {
        first_name: draft.first_name.trim().to_string(),
        last_name: draft.last_name.trim().to_string(),
        father_name: blank_to_none(&draft.father_name),
        phone_number: blank_to_none(&draft.phone_number),
        user_role: draft.user_role.clone(),
        date_of_birth: blank_to_none(&draft.date_of_birth),
        is_active: draft.is_active,
    }
}

fn new_draft() -> UserDraft {
    UserDraft {
        user_role: UserRole::Student.as_str().to_string(),
        is_active: true,
        ..UserDraft::default()
    }
}

#[component]
pub fn UsersPage() -> impl IntoView {
    let state = expect_context::<PortalState>();
    let (search, set_search) = signal(String::new());
    let (role_filter, set_role_filter) = signal(String::new());

    // Form state: `editing` is the user being edited, None while creating.
    let (show_form, set_show_form) = signal(false);
    let saving = RwSignal::new(false);
    let (editing, set_editing) = signal::<Option<i64>>(None);
    let draft = RwSignal::new(new_draft());
    let (confirm_delete, set_confirm_delete) = signal::<Option<i64>>(None);

    let can_manage = move || state.session.with(|s| can(s, Capability::ManageUsers));
    let stats = Memo::new(move |_| state.users.with(|u| u.stats()));

    let visible = move || {
        let role = UserRole::parse(&role_filter.get());
        let needle = search.get();
        state
            .users
            .with(|u| u.filter(&needle, role).into_iter().cloned().collect::<Vec<_>>())
    };

    let open_create = move |_| {
        draft.set(new_draft());
        set_editing.set(None);
        set_show_form.set(true);
    };

    let open_edit = move |id: i64| {
        let Some(user) = state.users.with_untracked(|u| u.find(id).cloned()) else {
            return;
        };
        draft.set(UserDraft {
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            father_name: user.father_name.clone(),
            phone_number: user.phone_number.clone(),
            user_role: user.user_role.as_str().to_string(),
            date_of_birth: user.date_of_birth.clone(),
            is_active: user.is_active,
            ..UserDraft::default()
        });
        set_editing.set(Some(id));
        set_show_form.set(true);
    };

    let save = move |_| {
        let form = draft.get();
        let target = editing.get();
        spawn_save(
            state,
            saving,
            async move {
                let client = api::client()?;
                let mut users = state.users.get_untracked();
                match target {
                    Some(id) => users.update(&client, id, &to_update(&form)).await?,
                    None => users.create(&client, &form).await?,
                };
                Ok((users, target.is_some()))
            },
            move |(users, edited)| {
                state.users.set(users);
                set_show_form.set(false);
                state.success(if edited {
                    "User updated successfully"
                } else {
                    "User created successfully"
                });
            },
        );
    };

    let delete = move |id: i64| {
        set_confirm_delete.set(None);
        spawn_task(
            state,
            async move {
                let client = api::client()?;
                let mut users = state.users.get_untracked();
                users.delete(&client, id).await?;
                Ok(users)
            },
            move |users| {
                state.users.set(users);
                state.success("User deleted successfully");
            },
        );
    };

    view! {
        <div class="page users-page">
            <div class="page-header">
                <h2>"Users"</h2>
                <Show when=can_manage>
                    <button class="btn btn-primary" on:click=open_create>"Create User"</button>
                </Show>
            </div>

            <div class="stats-grid">
                <StatCard label="Total Users" value=Signal::derive(move || stats.get().total) />
                <StatCard label="Students" value=Signal::derive(move || stats.get().students) />
                <StatCard label="Professors" value=Signal::derive(move || stats.get().professors) />
                <StatCard label="Admins" value=Signal::derive(move || stats.get().admins) />
            </div>

            <div class="filters">
                <input
                    type="text"
                    class="input"
                    placeholder="Search users..."
                    prop:value=move || search.get()
                    on:input=move |ev| set_search.set(event_target_value(&ev))
                />
                <select
                    class="input"
                    prop:value=move || role_filter.get()
                    on:change=move |ev| set_role_filter.set(event_target_value(&ev))
                >
                    <option value="">"All roles"</option>
                    {ROLE_OPTIONS
                        .iter()
                        .map(|&(val, text)| view! { <option value=val>{text}</option> })
                        .collect::<Vec<_>>()}
                </select>
            </div>

            <Show when=move || show_form.get()>
                <section class="form-panel">
                    <h3>{move || if editing.get().is_some() { "Edit User" } else { "Create User" }}</h3>
                    <Show when=move || editing.get().is_none()>
                        <TextField
                            label="Email"
                            kind="email"
                            value=Signal::derive(move || draft.with(|d| d.email.clone()))
                            on_input=move |v| draft.update(|d| d.email = v)
                        />
                        <TextField
                            label="Password"
                            kind="password"
                            value=Signal::derive(move || draft.with(|d| d.password.clone()))
                            on_input=move |v| draft.update(|d| d.password = v)
                        />
                    </Show>
                    <TextField
                        label="First name"
                        value=Signal::derive(move || draft.with(|d| d.first_name.clone()))
                        on_input=move |v| draft.update(|d| d.first_name = v)
                    />
                    <TextField
                        label="Last name"
                        value=Signal::derive(move || draft.with(|d| d.last_name.clone()))
                        on_input=move |v| draft.update(|d| d.last_name = v)
                    />
                    <TextField
                        label="Father's name"
                        value=Signal::derive(move || draft.with(|d| d.father_name.clone().unwrap_or_default()))
                        on_input=move |v| draft.update(|d| d.father_name = Some(v))
                    />
                    <TextField
                        label="Phone number"
                        value=Signal::derive(move || draft.with(|d| d.phone_number.clone().unwrap_or_default()))
                        on_input=move |v| draft.update(|d| d.phone_number = Some(v))
                    />
                    <TextField
                        label="Date of birth"
                        kind="date"
                        value=Signal::derive(move || draft.with(|d| d.date_of_birth.clone().unwrap_or_default()))
                        on_input=move |v| draft.update(|d| d.date_of_birth = Some(v))
                    />
                    <SelectField
                        label="Role"
                        options=ROLE_OPTIONS.to_vec()
                        value=Signal::derive(move || draft.with(|d| d.user_role.clone()))
                        on_change=move |v| draft.update(|d| d.user_role = v)
                    />
                    <CheckboxField
                        label="Active"
                        checked=Signal::derive(move || draft.with(|d| d.is_active))
                        on_change=move |v| draft.update(|d| d.is_active = v)
                    />
                    <div class="form-actions">
                        <button class="btn" on:click=move |_| set_show_form.set(false)>"Cancel"</button>
                        <button class="btn btn-primary" on:click=save disabled=move || saving.get()>
                            {move || if saving.get() { "Saving..." } else { "Save" }}
                        </button>
                    </div>
                </section>
            </Show>

            <table class="data-table">
                <thead>
                    <tr>
                        <th>"Name"</th>
                        <th>"Email"</th>
                        <th>"Role"</th>
                        <th>"Status"</th>
                        <th>"Joined"</th>
                        <th></th>
                    </tr>
                </thead>
                <tbody>
                    <For
                        each=visible
                        key=|user| (user.id, user.updated_at.clone(), user.first_name.clone(), user.last_name.clone())
                        children=move |user| {
                            let id = user.id;
                            view! {
                                <tr>
                                    <td>{user.display_name()}</td>
                                    <td>{user.email.clone()}</td>
                                    <td><span class="role-badge">{user.user_role.label()}</span></td>
                                    <td>{if user.is_active { "Active" } else { "Inactive" }}</td>
                                    <td>{format_date(&user.created_at)}</td>
                                    <td class="row-actions">
                                        <Show when=can_manage>
                                            <button class="btn btn-edit" on:click=move |_| open_edit(id)>"Edit"</button>
                                            {move || {
                                                if confirm_delete.get() == Some(id) {
                                                    view! {
                                                        <span class="confirm-delete">
                                                            "Delete this user? "
                                                            <button class="btn btn-delete" on:click=move |_| delete(id)>"Yes"</button>
                                                            <button class="btn" on:click=move |_| set_confirm_delete.set(None)>"No"</button>
                                                        </span>
                                                    }.into_any()
                                                } else {
                                                    view! {
                                                        <button class="btn btn-delete" on:click=move |_| set_confirm_delete.set(Some(id))>"Delete"</button>
                                                    }.into_any()
                                                }
                                            }}
                                        </Show>
                                    </td>
                                </tr>
                            }
                        }
                    />
                </tbody>
            </table>
        </div>
    }
}
