use leptos::prelude::*;

use crate::state::PortalState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub id: u64,
    pub kind: NoticeKind,
    pub message: String,
}

/// Toasts in the corner of the screen. Each one dismisses itself after a
/// few seconds or when clicked.
#[component]
pub fn Notifications() -> impl IntoView {
    let state = expect_context::<PortalState>();
    let notices = state.notices;

    view! {
        <div class="notifications">
            <For
                each=move || notices.get()
                key=|notice| notice.id
                children=move |notice| {
                    let class = match notice.kind {
                        NoticeKind::Success => "notification notification-success",
                        NoticeKind::Error => "notification notification-error",
                    };
                    let id = notice.id;
                    view! {
                        <div
                            class=class
                            on:click=move |_| notices.update(|n| n.retain(|x| x.id != id))
                        >
                            {notice.message}
                        </div>
                    }
                }
            />
        </div>
    }
}
