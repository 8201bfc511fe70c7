use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use super::lessons::Lesson;
use super::{check_success, contains_ci, take_item, take_list};
use crate::client::ApiClient;
use crate::endpoints;
use crate::error::PortalError;
use crate::http::Transport;
use crate::session::SessionStorage;
use crate::validation::is_blank;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created_by: Option<i64>,
    #[serde(default)]
    pub created_by_name: String,
    #[serde(default)]
    pub lessons_count: u32,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    /// Only present on the detail endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lessons: Option<Vec<Lesson>>,
}

fn default_active() -> bool {
    true
}

/// Body for course create and update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseDraft {
    pub title: String,
    pub description: String,
    pub is_active: bool,
}

impl Default for CourseDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            is_active: true,
        }
    }
}

impl CourseDraft {
    pub fn from_course(course: &Course) -> Self {
        Self {
            title: course.title.clone(),
            description: course.description.clone(),
            is_active: course.is_active,
        }
    }

    pub fn validate(&self) -> Result<(), PortalError> {
        if is_blank(&self.title) || is_blank(&self.description) {
            return Err(PortalError::Validation(
                "Please fill in all required fields".to_string(),
            ));
        }
        Ok(())
    }
}

/// Status filter on the course list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Inactive,
}

impl StatusFilter {
    pub fn matches(&self, course: &Course) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => course.is_active,
            StatusFilter::Inactive => !course.is_active,
        }
    }

    /// Parse a select value; anything unknown is `All`.
    pub fn parse(value: &str) -> Self {
        match value {
            "active" => StatusFilter::Active,
            "inactive" => StatusFilter::Inactive,
            _ => StatusFilter::All,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Active => "active",
            StatusFilter::Inactive => "inactive",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CourseStats {
    pub total: usize,
    pub active: usize,
    pub total_lessons: u32,
    pub mine: usize,
}

impl CourseStats {
    pub fn compute(courses: &[Course], current_user: Option<i64>) -> Self {
        Self {
            total: courses.len(),
            active: courses.iter().filter(|c| c.is_active).count(),
            total_lessons: courses.iter().map(|c| c.lessons_count).sum(),
            mine: current_user.map_or(0, |id| {
                courses.iter().filter(|c| c.created_by == Some(id)).count()
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseController {
    courses: Vec<Course>,
}

impl CourseController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn set_courses(&mut self, courses: Vec<Course>) {
        self.courses = courses;
    }

    pub fn find(&self, id: i64) -> Option<&Course> {
        self.courses.iter().find(|c| c.id == id)
    }

    pub fn stats(&self, current_user: Option<i64>) -> CourseStats {
        CourseStats::compute(&self.courses, current_user)
    }

    /// Courses whose title or description contains `search`, restricted by status.
    pub fn filter(&self, search: &str, status: StatusFilter) -> Vec<&Course> {
        let needle = search.trim().to_lowercase();
        self.courses
            .iter()
            .filter(|c| {
                needle.is_empty()
                    || contains_ci(&c.title, &needle)
                    || contains_ci(&c.description, &needle)
            })
            .filter(|c| status.matches(c))
            .collect()
    }

    pub async fn load<T: Transport, S: SessionStorage>(
        &mut self,
        client: &ApiClient<T, S>,
    ) -> Result<&[Course], PortalError> {
        let value: Value = client.get(endpoints::COURSES).await?;
        self.courses = take_list(value, &["courses", "results"], "Failed to load courses")?;
        info!("Loaded {} courses", self.courses.len());
        Ok(&self.courses)
    }

    /// A single course with its lessons.
    pub async fn fetch<T: Transport, S: SessionStorage>(
        &self,
        client: &ApiClient<T, S>,
        id: i64,
    ) -> Result<Course, PortalError> {
        let value: Value = client.get(&endpoints::course_detail(id)).await?;
        take_item(value, "course", "Failed to load course")
    }

    pub async fn create<T: Transport, S: SessionStorage>(
        &mut self,
        client: &ApiClient<T, S>,
        draft: &CourseDraft,
    ) -> Result<Course, PortalError> {
        draft.validate()?;
        let value: Value = client.post(endpoints::COURSE_CREATE, draft).await?;
        let course: Course = take_item(value, "course", "Failed to create course")?;
        info!("Created course '{}' ({})", course.title, course.id);
        self.courses.insert(0, course.clone());
        Ok(course)
    }

    pub async fn update<T: Transport, S: SessionStorage>(
        &mut self,
        client: &ApiClient<T, S>,
        id: i64,
        draft: &CourseDraft,
    ) -> Result<Course, PortalError> {
        draft.validate()?;
        let value: Value = client.put(&endpoints::course_update(id), draft).await?;
        let course: Course = take_item(value, "course", "Failed to update course")?;
        if let Some(slot) = self.courses.iter_mut().find(|c| c.id == id) {
            *slot = course.clone();
        }
        Ok(course)
    }

    pub async fn delete<T: Transport, S: SessionStorage>(
        &mut self,
        client: &ApiClient<T, S>,
        id: i64,
    ) -> Result<(), PortalError> {
        let value: Value = client.delete(&endpoints::course_delete(id)).await?;
        check_success(&value, "Failed to delete course")?;
        self.courses.retain(|c| c.id != id);
        info!("Deleted course {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn make_course(id: i64, title: &str, active: bool, lessons: u32, owner: i64) -> Course {
        serde_json::from_value(json!({
            "id": id,
            "title": title,
            "description": format!("About {}", title),
            "created_by": owner,
            "lessons_count": lessons,
            "is_active": active,
        }))
        .unwrap()
    }

    fn make_controller() -> CourseController {
        let mut controller = CourseController::new();
        controller.set_courses(vec![
            make_course(1, "Linear Algebra", true, 4, 10),
            make_course(2, "Compilers", false, 2, 11),
            make_course(3, "Operating Systems", true, 0, 10),
        ]);
        controller
    }

    #[test]
    fn test_stats_counts_own_courses() {
        let stats = make_controller().stats(Some(10));
        assert_eq!(
            stats,
            CourseStats {
                total: 3,
                active: 2,
                total_lessons: 6,
                mine: 2
            }
        );
        assert_eq!(make_controller().stats(None).mine, 0);
    }

    #[test]
    fn test_filter_search_and_status() {
        let controller = make_controller();
        let ids = |v: Vec<&Course>| v.iter().map(|c| c.id).collect::<Vec<_>>();

        assert_eq!(ids(controller.filter("", StatusFilter::All)), vec![1, 2, 3]);
        assert_eq!(ids(controller.filter("", StatusFilter::Inactive)), vec![2]);
        assert_eq!(ids(controller.filter("about o", StatusFilter::Active)), vec![3]);
        assert_eq!(ids(controller.filter("ALGEBRA", StatusFilter::All)), vec![1]);
    }

    #[test]
    fn test_course_without_lessons_field() {
        let course = make_course(1, "Linear Algebra", true, 4, 10);
        assert!(course.lessons.is_none());
        let value = serde_json::to_value(&course).unwrap();
        assert!(value.get("lessons").is_none());
    }

    #[test]
    fn test_draft_requires_title_and_description() {
        let mut draft = CourseDraft {
            title: "Databases".into(),
            description: "Relational theory".into(),
            ..CourseDraft::default()
        };
        assert!(draft.validate().is_ok());
        draft.description = "  ".into();
        assert!(matches!(draft.validate(), Err(PortalError::Validation(_))));
        assert_eq!(StatusFilter::parse("inactive"), StatusFilter::Inactive);
        assert_eq!(StatusFilter::parse("bogus"), StatusFilter::All);
    }
}
