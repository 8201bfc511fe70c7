use chrono::NaiveDate;
use leptos::prelude::*;
use portal_core::schedule::DayCell;

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Six-week month view. Clicking a day selects it.
#[component]
pub fn CalendarGrid(
    #[prop(into)] cells: Signal<Vec<DayCell>>,
    #[prop(into)] on_select: Callback<NaiveDate>,
) -> impl IntoView {
    view! {
        <div class="calendar">
            <div class="calendar-weekdays">
                {WEEKDAYS
                    .into_iter()
                    .map(|d| view! { <div class="calendar-weekday">{d}</div> })
                    .collect_view()}
            </div>
            <div class="calendar-grid">
                <For
                    each=move || cells.get()
                    key=|cell| (cell.date, cell.is_today, cell.event_count, cell.previews.clone())
                    children=move |cell| {
                        let mut class = String::from("calendar-day");
                        if cell.other_month {
                            class.push_str(" other-month");
                        }
                        if cell.is_today {
                            class.push_str(" today");
                        }
                        if cell.has_events() {
                            class.push_str(" has-events");
                        }
                        let date = cell.date;
                        let count = cell.event_count;
                        view! {
                            <div class=class on:click=move |_| on_select.run(date)>
                                <div class="day-number">{cell.day()}</div>
                                <Show when=move || { count > 0 }>
                                    <div class="day-event-count">{count}</div>
                                </Show>
                                <div class="day-events">
                                    {cell
                                        .previews
                                        .into_iter()
                                        .map(|p| view! { <div class="day-event">{p}</div> })
                                        .collect_view()}
                                </div>
                            </div>
                        }
                    }
                />
            </div>
        </div>
    }
}
