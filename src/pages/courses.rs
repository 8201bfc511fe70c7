use leptos::prelude::*;
use portal_core::capabilities::{can, Capability};
use portal_core::format::format_date;
use portal_core::navigation::Page;
use portal_core::resources::{CourseDraft, StatusFilter};

use crate::api;
use crate::components::fields::{CheckboxField, TextArea, TextField};
use crate::components::stat_card::StatCard;
use crate::state::{spawn_save, spawn_task, PortalState};

#[component]
pub fn CoursesPage() -> impl IntoView {
    let state = expect_context::<PortalState>();
    let (search, set_search) = signal(String::new());
    let (status, set_status) = signal(StatusFilter::All);

    let (show_form, set_show_form) = signal(false);
    let saving = RwSignal::new(false);
    let (editing, set_editing) = signal::<Option<i64>>(None);
    let draft = RwSignal::new(CourseDraft::default());
    let (confirm_delete, set_confirm_delete) = signal::<Option<i64>>(None);

    let can_manage = move || state.session.with(|s| can(s, Capability::ManageCourses));
    let stats = Memo::new(move |_| {
        let me = state.current_user_id();
        state.courses.with(|c| c.stats(me))
    });

    let visible = move || {
        let needle = search.get();
        let status = status.get();
        state
            .courses
            .with(|c| c.filter(&needle, status).into_iter().cloned().collect::<Vec<_>>())
    };

    let open_create = move |_| {
        draft.set(CourseDraft::default());
        set_editing.set(None);
        set_show_form.set(true);
    };

    let open_edit = move |id: i64| {
        if let Some(course) = state.courses.with_untracked(|c| c.find(id).cloned()) {
            draft.set(CourseDraft::from_course(&course));
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
                let mut courses = state.courses.get_untracked();
                match target {
                    Some(id) => courses.update(&client, id, &form).await?,
                    None => courses.create(&client, &form).await?,
                };
                Ok((courses, target.is_some()))
            },
            move |(courses, edited)| {
                state.courses.set(courses);
                set_show_form.set(false);
                state.success(if edited {
                    "Course updated successfully"
                } else {
                    "Course created successfully"
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
                let mut courses = state.courses.get_untracked();
                courses.delete(&client, id).await?;
                Ok(courses)
            },
            move |courses| {
                state.courses.set(courses);
                state.success("Course deleted successfully");
            },
        );
    };

    view! {
        <div class="page courses-page">
            <div class="page-header">
                <h2>"Courses"</h2>
                <Show when=can_manage>
                    <button class="btn btn-primary" on:click=open_create>"Create Course"</button>
                </Show>
            </div>

            <div class="stats-grid">
                <StatCard label="Total Courses" value=Signal::derive(move || stats.get().total) />
                <StatCard label="Active" value=Signal::derive(move || stats.get().active) />
                <StatCard label="Lessons" value=Signal::derive(move || stats.get().total_lessons as usize) />
                <StatCard label="My Courses" value=Signal::derive(move || stats.get().mine) />
            </div>

            <div class="filters">
                <input
                    type="text"
                    class="input"
                    placeholder="Search courses..."
                    prop:value=move || search.get()
                    on:input=move |ev| set_search.set(event_target_value(&ev))
                />
                <select
                    class="input"
                    prop:value=move || status.get().as_str()
                    on:change=move |ev| set_status.set(StatusFilter::parse(&event_target_value(&ev)))
                >
                    <option value="all">"All courses"</option>
                    <option value="active">"Active"</option>
                    <option value="inactive">"Inactive"</option>
                </select>
            </div>

            <Show when=move || show_form.get()>
                <section class="form-panel">
                    <h3>{move || if editing.get().is_some() { "Edit Course" } else { "Create Course" }}</h3>
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

            <div class="course-grid">
                <For
                    each=visible
                    key=|course| (course.id, course.updated_at.clone(), course.title.clone(), course.is_active)
                    children=move |course| {
                        let id = course.id;
                        view! {
                            <article class="course-card">
                                <h3>
                                    <a href=Page::CourseDetail(id).path()>{course.title.clone()}</a>
                                </h3>
                                <p class="course-description">{course.description.clone()}</p>
                                <div class="course-meta">
                                    <span>{format!("{} lessons", course.lessons_count)}</span>
                                    <span>{course.created_by_name.clone()}</span>
                                    <span>{format_date(&course.created_at)}</span>
                                    <span class=if course.is_active { "status active" } else { "status inactive" }>
                                        {if course.is_active { "Active" } else { "Inactive" }}
                                    </span>
                                </div>
                                <Show when=can_manage>
                                    <div class="row-actions">
                                        <button class="btn btn-edit" on:click=move |_| open_edit(id)>"Edit"</button>
                                        {move || {
                                            if confirm_delete.get() == Some(id) {
                                                view! {
                                                    <span class="confirm-delete">
                                                        "Delete this course and its lessons? "
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
                            </article>
                        }
                    }
                />
            </div>
        </div>
    }
}
