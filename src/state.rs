use std::future::Future;

use leptos::prelude::*;
use portal_core::navigation::{Page, PageLoader};
use portal_core::resources::{
    Course, CourseController, EventController, LessonController, ProfileController,
    UserController,
};
use portal_core::{PortalError, Session};
use tracing::warn;
use wasm_bindgen_futures::spawn_local;

use crate::api;
use crate::components::notifications::{Notice, NoticeKind};

/// Everything the views render, shared through context.
#[derive(Clone, Copy)]
pub struct PortalState {
    pub session: RwSignal<Session>,
    pub users: RwSignal<UserController>,
    pub courses: RwSignal<CourseController>,
    pub course: RwSignal<Option<Course>>,
    pub lessons: RwSignal<LessonController>,
    pub events: RwSignal<EventController>,
    pub profile: RwSignal<ProfileController>,
    pub notices: RwSignal<Vec<Notice>>,
    next_notice: StoredValue<u64>,
}

impl PortalState {
    pub fn new(session: Session) -> Self {
        Self {
            session: RwSignal::new(session),
            users: RwSignal::new(UserController::new()),
            courses: RwSignal::new(CourseController::new()),
            course: RwSignal::new(None),
            lessons: RwSignal::new(LessonController::new(0)),
            events: RwSignal::new(EventController::new()),
            profile: RwSignal::new(ProfileController::new()),
            notices: RwSignal::new(Vec::new()),
            next_notice: StoredValue::new(0),
        }
    }

    pub fn notify(&self, kind: NoticeKind, message: impl Into<String>) {
        let id = self.next_notice.get_value();
        self.next_notice.set_value(id + 1);
        let notice = Notice {
            id,
            kind,
            message: message.into(),
        };
        self.notices.update(|n| n.push(notice));

        let notices = self.notices;
        set_timeout(
            move || notices.update(|n| n.retain(|notice| notice.id != id)),
            std::time::Duration::from_secs(5),
        );
    }

    pub fn success(&self, message: impl Into<String>) {
        self.notify(NoticeKind::Success, message);
    }

    /// Show `err`; auth failures also drop back to the login prompt.
    pub fn report(&self, err: PortalError) {
        warn!("Request failed: {}", err);
        if err.requires_login() {
            self.session.set(Session::default());
        }
        self.notify(NoticeKind::Error, err.user_message());
    }

    /// Re-read the persisted session, e.g. after login or a profile edit.
    pub fn sync_session(&self) {
        match api::client() {
            Ok(client) => self.session.set(client.session()),
            Err(e) => self.report(e),
        }
    }

    pub fn current_user_id(&self) -> Option<i64> {
        self.session.with(|s| s.user_id())
    }
}

/// Run `task` in the background; `done` receives its value, errors are reported.
pub fn spawn_task<T, Fut, F>(state: PortalState, task: Fut, done: F)
where
    T: 'static,
    Fut: Future<Output = Result<T, PortalError>> + 'static,
    F: FnOnce(T) + 'static,
{
    spawn_local(async move {
        match task.await {
            Ok(value) => done(value),
            Err(e) => state.report(e),
        }
    });
}

/// Like [`spawn_task`] for form submits: `saving` stays true until the task
/// settles either way, and a submit while it is set is ignored.
pub fn spawn_save<T, Fut, F>(state: PortalState, saving: RwSignal<bool>, task: Fut, done: F)
where
    T: 'static,
    Fut: Future<Output = Result<T, PortalError>> + 'static,
    F: FnOnce(T) + 'static,
{
    if saving.get_untracked() {
        return;
    }
    saving.set(true);
    spawn_local(async move {
        let result = task.await;
        saving.set(false);
        match result {
            Ok(value) => done(value),
            Err(e) => state.report(e),
        }
    });
}

/// Fetches the data behind each page when navigation enters it.
pub struct PortalLoader {
    state: PortalState,
}

impl PortalLoader {
    pub fn new(state: PortalState) -> Self {
        Self { state }
    }
}

impl PageLoader for PortalLoader {
    fn load(&mut self, page: Page) {
        let state = self.state;
        match page {
            Page::Main => load_courses(state),
            Page::Users => spawn_task(
                state,
                async move {
                    let client = api::client()?;
                    let mut users = state.users.get_untracked();
                    users.load(&client).await?;
                    Ok(users)
                },
                move |users| state.users.set(users),
            ),
            Page::Courses => load_courses(state),
            Page::CourseDetail(id) => {
                state.course.set(None);
                state.lessons.set(LessonController::new(id));
                spawn_task(
                    state,
                    async move {
                        let client = api::client()?;
                        let course = CourseController::new().fetch(&client, id).await?;
                        let mut lessons = LessonController::new(id);
                        lessons.load(&client).await?;
                        Ok((course, lessons))
                    },
                    move |(course, lessons)| {
                        state.course.set(Some(course));
                        state.lessons.set(lessons);
                    },
                )
            }
            Page::Schedule => load_events(state),
            Page::Settings => spawn_task(
                state,
                async move {
                    let client = api::client()?;
                    let mut profile = state.profile.get_untracked();
                    profile.load(&client).await?;
                    Ok(profile)
                },
                move |profile| state.profile.set(profile),
            ),
        }
    }
}

pub fn load_courses(state: PortalState) {
    spawn_task(
        state,
        async move {
            let client = api::client()?;
            let mut courses = state.courses.get_untracked();
            courses.load(&client).await?;
            Ok(courses)
        },
        move |courses| state.courses.set(courses),
    );
}

pub fn load_events(state: PortalState) {
    spawn_task(
        state,
        async move {
            let client = api::client()?;
            let mut events = state.events.get_untracked();
            events.load(&client).await?;
            Ok(events)
        },
        move |events| state.events.set(events),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_while_saving_is_ignored() {
        let state = PortalState::new(Session::default());
        let saving = RwSignal::new(true);

        spawn_save(
            state,
            saving,
            async { Ok::<_, PortalError>(()) },
            |()| panic!("a second submit must not run"),
        );

        assert!(saving.get_untracked());
        assert!(state.notices.get_untracked().is_empty());
    }
}
