use leptos::prelude::*;
use portal_core::capabilities::{can, Capability};
use portal_core::navigation::Page;

use crate::api;
use crate::state::PortalState;

#[component]
pub fn Sidebar(
    /// The page currently shown, for highlighting its link
    #[prop(into)]
    active: Signal<Option<Page>>,
) -> impl IntoView {
    let state = expect_context::<PortalState>();

    let logout = move |_| {
        match api::client().and_then(|client| client.logout()) {
            Ok(()) => state.success("Logged out"),
            Err(e) => state.report(e),
        }
        state.sync_session();
    };

    view! {
        <nav class="sidebar">
            <div class="sidebar-header">
                <h1 class="sidebar-title">"University Portal"</h1>
                <p class="sidebar-subtitle">"Courses, people and schedule"</p>
            </div>
            <ul class="nav-list">
                {Page::MENU
                    .into_iter()
                    .map(|page| {
                        let visible = move || {
                            state.session.with(|s| can(s, page.required_capability()))
                        };
                        let class = move || {
                            let current = active.get().map(|p| match p {
                                Page::CourseDetail(_) => Page::Courses,
                                other => other,
                            });
                            if current == Some(page) { "nav-link active" } else { "nav-link" }
                        };
                        view! {
                            <Show when=visible>
                                <li class="nav-item">
                                    <a href=page.path() class=class>{page.title()}</a>
                                </li>
                            </Show>
                        }
                    })
                    .collect_view()}
            </ul>
            <div class="user-info">
                {move || {
                    let session = state.session.get();
                    match session.user.filter(|_| session.is_authenticated) {
                        Some(user) => view! {
                            <div class="user-details">
                                <div class="user-name">{user.display_name()}</div>
                                <div class="user-role">{user.user_role.label()}</div>
                                <Show when=move || state.session.with(|s| can(s, Capability::LogOut))>
                                    <button class="btn btn-logout" on:click=logout>"Log Out"</button>
                                </Show>
                            </div>
                        }
                        .into_any(),
                        None => view! { <p class="login-hint">"Not logged in"</p> }.into_any(),
                    }
                }}
            </div>
        </nav>
    }
}
