use leptos::prelude::*;
use portal_core::navigation::Page;

use crate::components::stat_card::StatCard;
use crate::state::PortalState;

#[component]
pub fn HomePage() -> impl IntoView {
    let state = expect_context::<PortalState>();
    let stats = Memo::new(move |_| {
        let me = state.current_user_id();
        state.courses.with(|c| c.stats(me))
    });
    let greeting = move || {
        state
            .session
            .with(|s| s.user.as_ref().map(|u| format!("Welcome, {}", u.first_name)))
            .unwrap_or_else(|| "Welcome".to_string())
    };

    view! {
        <div class="page home-page">
            <h2>{greeting}</h2>
            <p class="section-description">
                "Your central hub for academic and administrative activities"
            </p>

            <div class="stats-grid">
                <StatCard label="Courses" value=Signal::derive(move || stats.get().total) />
                <StatCard label="Active Courses" value=Signal::derive(move || stats.get().active) />
                <StatCard label="Lessons" value=Signal::derive(move || stats.get().total_lessons as usize) />
                <StatCard label="My Courses" value=Signal::derive(move || stats.get().mine) />
            </div>

            <section class="quick-links">
                <a href=Page::Courses.path() class="btn">"Browse courses"</a>
                <a href=Page::Schedule.path() class="btn">"Open schedule"</a>
            </section>
        </div>
    }
}
