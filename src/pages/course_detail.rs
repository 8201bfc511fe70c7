use leptos::prelude::*;
use portal_core::capabilities::{can, Capability};
use portal_core::format::format_date;
use portal_core::navigation::Page;
use portal_core::resources::LessonDraft;

use crate::api;
use crate::components::fields::{TextArea, TextField};
use crate::state::{spawn_save, spawn_task, PortalState};

/// Raw lesson form input; the order stays text until submitted.
#[derive(Debug, Clone, Default, PartialEq)]
struct LessonForm {
    title: String,
    short_description: String,
    full_text: String,
    order: String,
}

impl LessonForm {
    fn with_order(order: u32) -> Self {
        Self {
            order: order.to_string(),
            ..Self::default()
        }
    }

    fn to_draft(&self, course: i64) -> LessonDraft {
        LessonDraft::from_form(
            course,
            &self.title,
            &self.short_description,
            &self.full_text,
            &self.order,
        )
    }
}

#[component]
pub fn CourseDetailPage() -> impl IntoView {
    let state = expect_context::<PortalState>();
    let (show_form, set_show_form) = signal(false);
    let saving = RwSignal::new(false);
    let (editing, set_editing) = signal::<Option<i64>>(None);
    let form = RwSignal::new(LessonForm::default());
    let (expanded, set_expanded) = signal::<Option<i64>>(None);
    let (confirm_delete, set_confirm_delete) = signal::<Option<i64>>(None);

    let can_manage = move || state.session.with(|s| can(s, Capability::ManageLessons));
    let lessons = move || state.lessons.with(|l| l.lessons().to_vec());

    let open_create = move |_| {
        let next = state.lessons.with_untracked(|l| l.next_order());
        form.set(LessonForm::with_order(next));
        set_editing.set(None);
        set_show_form.set(true);
    };

    let open_edit = move |id: i64| {
        if let Some(lesson) = state.lessons.with_untracked(|l| l.find(id).cloned()) {
            form.set(LessonForm {
                title: lesson.title,
                short_description: lesson.short_description,
                full_text: lesson.full_text,
                order: lesson.order.to_string(),
            });
            set_editing.set(Some(id));
            set_show_form.set(true);
        }
    };

    let save = move |_| {
        let target = editing.get();
        let course = state.lessons.with_untracked(|l| l.course_id());
        let draft = form.with(|f| f.to_draft(course));
        spawn_save(
            state,
            saving,
            async move {
                let client = api::client()?;
                let mut lessons = state.lessons.get_untracked();
                match target {
                    Some(id) => lessons.update(&client, id, &draft).await?,
                    None => lessons.create(&client, &draft).await?,
                };
                Ok((lessons, target.is_some()))
            },
            move |(lessons, edited)| {
                state.lessons.set(lessons);
                set_show_form.set(false);
                state.success(if edited {
                    "Lesson updated successfully"
                } else {
                    "Lesson created successfully"
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
                let mut lessons = state.lessons.get_untracked();
                lessons.delete(&client, id).await?;
                Ok(lessons)
            },
            move |lessons| {
                state.lessons.set(lessons);
                state.success("Lesson deleted successfully");
            },
        );
    };

    view! {
        <div class="page course-detail-page">
            <a class="back-link" href=Page::Courses.path()>"Back to courses"</a>
            {move || match state.course.get() {
                Some(course) => view! {
                    <header class="course-header">
                        <h2>{course.title.clone()}</h2>
                        <p>{course.description.clone()}</p>
                        <div class="course-meta">
                            <span>{course.created_by_name.clone()}</span>
                            <span>{format_date(&course.created_at)}</span>
                            <span>{if course.is_active { "Active" } else { "Inactive" }}</span>
                        </div>
                    </header>
                }.into_any(),
                None => view! { <p class="loading">"Loading course..."</p> }.into_any(),
            }}

            <div class="page-header">
                <h3>"Lessons"</h3>
                <Show when=can_manage>
                    <button class="btn btn-primary" on:click=open_create>"Add Lesson"</button>
                </Show>
            </div>

            <Show when=move || show_form.get()>
                <section class="form-panel">
                    <h3>{move || if editing.get().is_some() { "Edit Lesson" } else { "Add Lesson" }}</h3>
                    <TextField
                        label="Title"
                        value=Signal::derive(move || form.with(|f| f.title.clone()))
                        on_input=move |v| form.update(|f| f.title = v)
                    />
                    <TextField
                        label="Short description"
                        value=Signal::derive(move || form.with(|f| f.short_description.clone()))
                        on_input=move |v| form.update(|f| f.short_description = v)
                    />
                    <TextArea
                        label="Full text"
                        value=Signal::derive(move || form.with(|f| f.full_text.clone()))
                        on_input=move |v| form.update(|f| f.full_text = v)
                    />
                    <TextField
                        label="Order"
                        kind="number"
                        value=Signal::derive(move || form.with(|f| f.order.clone()))
                        on_input=move |v| form.update(|f| f.order = v)
                    />
                    <div class="form-actions">
                        <button class="btn" on:click=move |_| set_show_form.set(false)>"Cancel"</button>
                        <button class="btn btn-primary" on:click=save disabled=move || saving.get()>
                            {move || if saving.get() { "Saving..." } else { "Save" }}
                        </button>
                    </div>
                </section>
            </Show>

            <Show
                when=move || state.lessons.with(|l| !l.lessons().is_empty())
                fallback=|| view! { <p class="empty">"No lessons yet."</p> }
            >
                <ol class="lesson-list">
                    <For
                        each=lessons
                        key=|lesson| (lesson.id, lesson.order, lesson.updated_at.clone(), lesson.title.clone())
                        children=move |lesson| {
                            let id = lesson.id;
                            let full_text = lesson.full_text.clone();
                            view! {
                                <li class="lesson">
                                    <div class="lesson-summary">
                                        <span class="lesson-order">{lesson.order}</span>
                                        <button
                                            class="lesson-title"
                                            on:click=move |_| set_expanded.update(|e| {
                                                *e = if *e == Some(id) { None } else { Some(id) };
                                            })
                                        >
                                            {lesson.title.clone()}
                                        </button>
                                        <span class="lesson-short">{lesson.short_description.clone()}</span>
                                    </div>
                                    <Show when=move || expanded.get() == Some(id)>
                                        <div class="lesson-body">{full_text.clone()}</div>
                                    </Show>
                                    <Show when=can_manage>
                                        <div class="row-actions">
                                            <button class="btn btn-edit" on:click=move |_| open_edit(id)>"Edit"</button>
                                            {move || {
                                                if confirm_delete.get() == Some(id) {
                                                    view! {
                                                        <span class="confirm-delete">
                                                            "Delete this lesson? "
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
                </ol>
            </Show>
        </div>
    }
}
