use leptos::prelude::*;

#[component]
pub fn StatCard(
    /// Caption under the number, e.g. "Active Courses"
    #[prop(into)]
    label: String,
    /// The counter to show
    #[prop(into)]
    value: Signal<usize>,
) -> impl IntoView {
    view! {
        <div class="stat-card">
            <span class="stat-value">{move || value.get()}</span>
            <span class="stat-label">{label}</span>
        </div>
    }
}
