use leptos::prelude::*;
use leptos_router::components::*;
use leptos_router::hooks::use_location;
use leptos_router::path;
use portal_core::navigation::{NavigationController, Page};
use portal_core::Session;
use tracing::info;

use crate::api;
use crate::components::login_form::LoginForm;
use crate::components::notifications::Notifications;
use crate::components::sidebar::Sidebar;
use crate::pages::course_detail::CourseDetailPage;
use crate::pages::courses::CoursesPage;
use crate::pages::home::HomePage;
use crate::pages::schedule::SchedulePage;
use crate::pages::settings::SettingsPage;
use crate::pages::users::UsersPage;
use crate::state::{PortalLoader, PortalState};

#[component]
pub fn App() -> impl IntoView {
    let session = match api::client() {
        Ok(client) => client.session(),
        Err(e) => {
            tracing::warn!("Portal client unavailable: {}", e);
            Session::default()
        }
    };
    let state = PortalState::new(session);
    provide_context(state);

    view! {
        <Router>
            <Shell />
        </Router>
    }
}

/// Layout inside the router: sidebar, active page and notifications.
#[component]
fn Shell() -> impl IntoView {
    let state = expect_context::<PortalState>();
    let location = use_location();
    let nav = StoredValue::new(NavigationController::new());
    let (active, set_active) = signal::<Option<Page>>(None);
    let is_authenticated = Memo::new(move |_| state.session.with(Session::is_authenticated));

    // Each route change (or a login) enters the page once and loads its data.
    Effect::new(move |_| {
        let path = location.pathname.get();
        if !is_authenticated.get() {
            nav.update_value(NavigationController::reset);
            set_active.set(None);
            return;
        }
        let Some(page) = Page::from_path(&path) else {
            return;
        };

        let session = state.session.get_untracked();
        let mut loader = PortalLoader::new(state);
        let mut controller = nav.get_value();
        match controller.navigate_as(&session, page, &mut loader) {
            Ok(page) => info!("Entered {}", page),
            Err(e) => state.report(e),
        }
        set_active.set(controller.active());
        nav.set_value(controller);
    });

    view! {
        <div class="app-layout">
            <Sidebar active=active />
            <main class="content">
                <Show when=move || is_authenticated.get() fallback=|| view! { <LoginForm /> }>
                    <Routes fallback=|| view! { <p>"Page not found"</p> }>
                        <Route path=path!("/") view=HomePage />
                        <Route path=path!("/users") view=UsersPage />
                        <Route path=path!("/courses") view=CoursesPage />
                        <Route path=path!("/courses/:id") view=CourseDetailPage />
                        <Route path=path!("/schedule") view=SchedulePage />
                        <Route path=path!("/settings") view=SettingsPage />
                    </Routes>
                </Show>
            </main>
            <Notifications />
        </div>
    }
}
