//! Page routing: which view is active and when its data is loaded.

use std::fmt;

use tracing::debug;

use crate::capabilities::{require, Capability};
use crate::error::PortalError;
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Main,
    Users,
    Courses,
    CourseDetail(i64),
    Schedule,
    Settings,
}

impl Page {
    /// Pages listed in the sidebar, in display order.
    pub const MENU: [Page; 5] = [
        Page::Main,
        Page::Users,
        Page::Courses,
        Page::Schedule,
        Page::Settings,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Page::Main => "Dashboard",
            Page::Users => "Users",
            Page::Courses => "Courses",
            Page::CourseDetail(_) => "Course",
            Page::Schedule => "Schedule",
            Page::Settings => "Settings",
        }
    }

    pub fn required_capability(&self) -> Capability {
        match self {
            Page::Main => Capability::ViewDashboard,
            Page::Users => Capability::ViewUsers,
            Page::Courses | Page::CourseDetail(_) => Capability::ViewCourses,
            Page::Schedule => Capability::ViewSchedule,
            Page::Settings => Capability::EditProfile,
        }
    }

    /// Router path, e.g. `/courses/7`.
    pub fn path(&self) -> String {
        match self {
            Page::Main => "/".to_string(),
            Page::Users => "/users".to_string(),
            Page::Courses => "/courses".to_string(),
            Page::CourseDetail(id) => format!("/courses/{}", id),
            Page::Schedule => "/schedule".to_string(),
            Page::Settings => "/settings".to_string(),
        }
    }

    /// Parse a router path. Unknown paths are `None`.
    pub fn from_path(path: &str) -> Option<Self> {
        let trimmed = path.trim_matches('/');
        let mut parts = trimmed.split('/');
        let page = match (parts.next(), parts.next(), parts.next()) {
            (Some(""), None, None) | (Some("main"), None, None) => Page::Main,
            (Some("users"), None, None) => Page::Users,
            (Some("courses"), None, None) => Page::Courses,
            (Some("courses"), Some(id), None) => Page::CourseDetail(id.parse().ok()?),
            (Some("schedule"), None, None) => Page::Schedule,
            (Some("settings"), None, None) => Page::Settings,
            _ => return None,
        };
        Some(page)
    }

    /// URL fragment, e.g. `#users`.
    pub fn fragment(&self) -> String {
        match self {
            Page::Main => "#main".to_string(),
            Page::CourseDetail(id) => format!("#courses/{}", id),
            other => format!("#{}", other.path().trim_start_matches('/')),
        }
    }

    pub fn from_fragment(fragment: &str) -> Option<Self> {
        Self::from_path(fragment.trim_start_matches('#'))
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Fetches the data a page shows. Called once each time the page is entered.
pub trait PageLoader {
    fn load(&mut self, page: Page);
}

impl<F: FnMut(Page)> PageLoader for F {
    fn load(&mut self, page: Page) {
        self(page)
    }
}

/// Tracks the single active page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationController {
    active: Option<Page>,
}

impl NavigationController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<Page> {
        self.active
    }

    pub fn is_active(&self, page: Page) -> bool {
        self.active == Some(page)
    }

    /// Make `page` the active view, replacing whatever was shown, and load it.
    pub fn navigate<L: PageLoader + ?Sized>(&mut self, page: Page, loader: &mut L) -> Page {
        if let Some(previous) = self.active.replace(page) {
            debug!("Leaving {:?} for {:?}", previous, page);
        }
        loader.load(page);
        page
    }

    /// Like [`navigate`](Self::navigate), but only when the session may see
    /// the page. A refused navigation leaves the active page unchanged.
    pub fn navigate_as<L: PageLoader + ?Sized>(
        &mut self,
        session: &Session,
        page: Page,
        loader: &mut L,
    ) -> Result<Page, PortalError> {
        require(
            session,
            page.required_capability(),
            &format!("view {}", page.title().to_lowercase()),
        )?;
        Ok(self.navigate(page, loader))
    }

    /// Forget the active page, e.g. on logout.
    pub fn reset(&mut self) {
        self.active = None;
    }
}
