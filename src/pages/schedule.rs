use chrono::NaiveDate;
use leptos::prelude::*;
use portal_core::capabilities::{can, Capability};
use portal_core::format::format_long_date;
use portal_core::resources::{EventDraft, EventPriority, EventType};
use portal_core::schedule::{Agenda, CalendarMonth, EventStats};

use crate::api;
use crate::components::calendar_grid::CalendarGrid;
use crate::components::fields::{CheckboxField, SelectField, TextArea, TextField};
use crate::components::stat_card::StatCard;
use crate::state::{spawn_save, spawn_task, PortalState};

fn type_options() -> Vec<(&'static str, &'static str)> {
    EventType::ALL.iter().map(|t| (t.as_str(), t.label())).collect()
}

fn priority_options() -> Vec<(&'static str, &'static str)> {
    EventPriority::ALL
        .iter()
        .map(|p| (p.as_str(), p.label()))
        .collect()
}

fn draft_on(date: NaiveDate) -> EventDraft {
    EventDraft {
        assigned_date: date.format("%Y-%m-%d").to_string(),
        ..EventDraft::default()
    }
}

#[component]
pub fn SchedulePage() -> impl IntoView {
    let state = expect_context::<PortalState>();
    let today = api::today();
    let (month, set_month) = signal(CalendarMonth::containing(today));
    let (selected, set_selected) = signal(today);

    let (show_form, set_show_form) = signal(false);
    let saving = RwSignal::new(false);
    let (editing, set_editing) = signal::<Option<i64>>(None);
    let draft = RwSignal::new(draft_on(today));
    let (confirm_delete, set_confirm_delete) = signal::<Option<i64>>(None);

    let can_manage = move || state.session.with(|s| can(s, Capability::ManageEvents));
    let agenda = Memo::new(move |_| state.events.with(|e| Agenda::organize(e.events())));
    let cells = Signal::derive(move || agenda.with(|a| month.get().grid(today, a)));
    let stats = Memo::new(move |_| {
        let me = state.current_user_id();
        state.events.with(|e| EventStats::compute(e.events(), today, me))
    });
    let day_events = move || agenda.with(|a| a.on(selected.get()).to_vec());

    let open_create = move |_| {
        draft.set(draft_on(selected.get_untracked()));
        set_editing.set(None);
        set_show_form.set(true);
    };

    let open_edit = move |id: i64| {
        if let Some(event) = state.events.with_untracked(|e| e.find(id).cloned()) {
            draft.set(EventDraft::from_event(&event));
            set_editing.set(Some(id));
            set_show_form.set(true);
        }
    };

    let save = move |_| {
        let form = draft.get();
        let target = editing.get();
        spawn_save(
            state,
            saving,
            async move {
                let client = api::client()?;
                let mut events = state.events.get_untracked();
                match target {
                    Some(id) => events.update(&client, id, &form).await?,
                    None => {
                        events.create(&client, &form).await?;
                    }
                }
                Ok((events, target.is_some()))
            },
            move |(events, edited)| {
                state.events.set(events);
                set_show_form.set(false);
                state.success(if edited {
                    "Event updated successfully"
                } else {
                    "Event created successfully"
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
                let mut events = state.events.get_untracked();
                events.delete(&client, id).await?;
                Ok(events)
            },
            move |events| {
                state.events.set(events);
                state.success("Event deleted successfully");
            },
        );
    };

    view! {
        <div class="page schedule-page">
            <div class="page-header">
                <h2>"Schedule"</h2>
                <Show when=can_manage>
                    <button class="btn btn-primary" on:click=open_create>"Add Event"</button>
                </Show>
            </div>

            <div class="stats-grid">
                <StatCard label="Total Events" value=Signal::derive(move || stats.get().total) />
                <StatCard label="Today" value=Signal::derive(move || stats.get().today) />
                <StatCard label="This Week" value=Signal::derive(move || stats.get().this_week) />
                <StatCard label="My Events" value=Signal::derive(move || stats.get().mine) />
            </div>

            <div class="calendar-header">
                <button class="btn" on:click=move |_| set_month.update(|m| *m = m.previous())>"<"</button>
                <h3>{move || month.get().title()}</h3>
                <button class="btn" on:click=move |_| set_month.update(|m| *m = m.next())>">"</button>
                <button
                    class="btn"
                    on:click=move |_| {
                        set_month.set(CalendarMonth::containing(today));
                        set_selected.set(today);
                    }
                >
                    "Today"
                </button>
            </div>

            <CalendarGrid cells=cells on_select=move |date| set_selected.set(date) />

            <Show when=move || show_form.get()>
                <section class="form-panel">
                    <h3>{move || if editing.get().is_some() { "Edit Event" } else { "Add Event" }}</h3>
                    <TextField
                        label="Title"
                        value=Signal::derive(move || draft.with(|d| d.title.clone()))
                        on_input=move |v| draft.update(|d| d.title = v)
                    />
                    <TextArea
                        label="Description"
                        value=Signal::derive(move || draft.with(|d| d.description.clone()))
                        on_input=move |v| draft.update(|d| d.description = v)
                    />
                    <TextField
                        label="Date"
                        kind="date"
                        value=Signal::derive(move || draft.with(|d| d.assigned_date.clone()))
                        on_input=move |v| draft.update(|d| d.assigned_date = v)
                    />
                    <CheckboxField
                        label="All day"
                        checked=Signal::derive(move || draft.with(|d| d.is_all_day))
                        on_change=move |v| draft.update(|d| d.is_all_day = v)
                    />
                    <Show when=move || !draft.with(|d| d.is_all_day)>
                        <TextField
                            label="Start time"
                            kind="time"
                            value=Signal::derive(move || draft.with(|d| d.start_time.clone().unwrap_or_default()))
                            on_input=move |v| draft.update(|d| d.start_time = Some(v))
                        />
                        <TextField
                            label="End time"
                            kind="time"
                            value=Signal::derive(move || draft.with(|d| d.end_time.clone().unwrap_or_default()))
                            on_input=move |v| draft.update(|d| d.end_time = Some(v))
                        />
                    </Show>
                    <SelectField
                        label="Type"
                        options=type_options()
                        value=Signal::derive(move || draft.with(|d| d.event_type.as_str().to_string()))
                        on_change=move |v: String| draft.update(|d| d.event_type = EventType::parse(&v).unwrap_or_default())
                    />
                    <SelectField
                        label="Priority"
                        options=priority_options()
                        value=Signal::derive(move || draft.with(|d| d.priority.as_str().to_string()))
                        on_change=move |v: String| draft.update(|d| d.priority = EventPriority::parse(&v).unwrap_or_default())
                    />
                    <TextField
                        label="Location"
                        value=Signal::derive(move || draft.with(|d| d.location.clone()))
                        on_input=move |v| draft.update(|d| d.location = v)
                    />
                    <CheckboxField
                        label="Recurring"
                        checked=Signal::derive(move || draft.with(|d| d.is_recurring))
                        on_change=move |v| draft.update(|d| d.is_recurring = v)
                    />
                    <div class="form-actions">
                        <button class="btn" on:click=move |_| set_show_form.set(false)>"Cancel"</button>
                        <button class="btn btn-primary" on:click=save disabled=move || saving.get()>
                            {move || if saving.get() { "Saving..." } else { "Save" }}
                        </button>
                    </div>
                </section>
            </Show>

            <section class="day-events">
                <h3>{move || format_long_date(selected.get())}</h3>
                <Show
                    when=move || agenda.with(|a| !a.on(selected.get()).is_empty())
                    fallback=|| view! { <p class="empty">"No events on this day."</p> }
                >
                    <ul class="event-list">
                        <For
                            each=day_events
                            key=|event| (event.id, event.updated_at.clone(), event.title.clone())
                            children=move |event| {
                                let id = event.id;
                                let class = format!("event priority-{}", event.priority.as_str());
                                view! {
                                    <li class=class>
                                        <div class="event-time">{event.time_label()}</div>
                                        <div class="event-info">
                                            <strong>{event.title.clone()}</strong>
                                            <span class="event-type">{event.event_type.label()}</span>
                                            <span class="event-priority">{event.priority.label()}</span>
                                            {event.location.clone().map(|l| view! { <span class="event-location">{l}</span> })}
                                            {event.creator.as_ref().map(|c| {
                                                let name = c.full_name.clone();
                                                view! { <span class="event-creator">{name}</span> }
                                            })}
                                        </div>
                                        <Show when=can_manage>
                                            <div class="row-actions">
                                                <button class="btn btn-edit" on:click=move |_| open_edit(id)>"Edit"</button>
                                                {move || {
                                                    if confirm_delete.get() == Some(id) {
                                                        view! {
                                                            <span class="confirm-delete">
                                                                "Delete this event? "
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
                                            </div>
                                        </Show>
                                    </li>
                                }
                            }
                        />
                    </ul>
                </Show>
            </section>
        </div>
    }
}
