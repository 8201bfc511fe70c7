use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use super::{check_success, take_item, take_list};
use crate::client::ApiClient;
use crate::endpoints;
use crate::error::PortalError;
use crate::http::Transport;
use crate::session::SessionStorage;
use crate::validation::{parse_order, require_all};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: i64,
    pub course: i64,
    #[serde(default)]
    pub course_title: Option<String>,
    pub title: String,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub full_text: String,
    #[serde(default = "default_order")]
    pub order: u32,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

fn default_order() -> u32 {
    1
}

/// Body for lesson create and update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LessonDraft {
    pub course: i64,
    pub title: String,
    pub short_description: String,
    pub full_text: String,
    pub order: u32,
}

impl LessonDraft {
    /// Draft from raw form input; the order field falls back to 1.
    pub fn from_form(
        course: i64,
        title: &str,
        short_description: &str,
        full_text: &str,
        order: &str,
    ) -> Self {
        Self {
            course,
            title: title.trim().to_string(),
            short_description: short_description.trim().to_string(),
            full_text: full_text.trim().to_string(),
            order: parse_order(order),
        }
    }

    pub fn from_lesson(lesson: &Lesson) -> Self {
        Self {
            course: lesson.course,
            title: lesson.title.clone(),
            short_description: lesson.short_description.clone(),
            full_text: lesson.full_text.clone(),
            order: lesson.order,
        }
    }

    pub fn validate(&self) -> Result<(), PortalError> {
        require_all(
            &[&self.title, &self.short_description, &self.full_text],
            "Please fill in all required fields",
        )
    }
}

/// Lessons of one course, kept sorted by their order.
#[derive(Debug, Clone, PartialEq)]
pub struct LessonController {
    course_id: i64,
    lessons: Vec<Lesson>,
}

impl LessonController {
    pub fn new(course_id: i64) -> Self {
        Self {
            course_id,
            lessons: Vec::new(),
        }
    }

    pub fn course_id(&self) -> i64 {
        self.course_id
    }

    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    pub fn find(&self, id: i64) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.id == id)
    }

    pub fn set_lessons(&mut self, lessons: Vec<Lesson>) {
        self.lessons = lessons;
        self.sort();
    }

    fn sort(&mut self) {
        self.lessons.sort_by_key(|l| l.order);
    }

    /// One past the highest order in use.
    pub fn next_order(&self) -> u32 {
        self.lessons.iter().map(|l| l.order).max().unwrap_or(0) + 1
    }

    /// Reject an order already taken by another lesson of this course.
    /// `editing` is the lesson being updated, which may keep its own order.
    pub fn check_order(&self, order: u32, editing: Option<i64>) -> Result<(), PortalError> {
        let taken = self
            .lessons
            .iter()
            .any(|l| l.order == order && Some(l.id) != editing);
        if taken {
            return Err(PortalError::Validation(format!(
                "A lesson with order {} already exists in this course. Please choose a different order.",
                order
            )));
        }
        Ok(())
    }

    fn check_draft(&self, draft: &LessonDraft, editing: Option<i64>) -> Result<(), PortalError> {
        draft.validate()?;
        if draft.course != self.course_id {
            return Err(PortalError::Validation(
                "Lesson belongs to a different course".to_string(),
            ));
        }
        self.check_order(draft.order, editing).inspect_err(|_| {
            warn!(
                "Rejected lesson order {} for course {}",
                draft.order, self.course_id
            )
        })
    }

    pub async fn load<T: Transport, S: SessionStorage>(
        &mut self,
        client: &ApiClient<T, S>,
    ) -> Result<&[Lesson], PortalError> {
        let value: Value = client
            .get(&endpoints::lessons_for_course(self.course_id))
            .await?;
        let lessons = take_list(value, &["lessons", "results"], "Failed to load lessons")?;
        self.set_lessons(lessons);
        info!(
            "Loaded {} lessons for course {}",
            self.lessons.len(),
            self.course_id
        );
        Ok(&self.lessons)
    }

    pub async fn create<T: Transport, S: SessionStorage>(
        &mut self,
        client: &ApiClient<T, S>,
        draft: &LessonDraft,
    ) -> Result<Lesson, PortalError> {
        self.check_draft(draft, None)?;
        let value: Value = client.post(endpoints::LESSON_CREATE, draft).await?;
        let lesson: Lesson = take_item(value, "lesson", "Failed to create lesson")?;
        info!("Created lesson '{}' ({})", lesson.title, lesson.id);
        self.lessons.push(lesson.clone());
        self.sort();
        Ok(lesson)
    }

    pub async fn update<T: Transport, S: SessionStorage>(
        &mut self,
        client: &ApiClient<T, S>,
        id: i64,
        draft: &LessonDraft,
    ) -> Result<Lesson, PortalError> {
        self.check_draft(draft, Some(id))?;
        let value: Value = client.put(&endpoints::lesson_update(id), draft).await?;
        let lesson: Lesson = take_item(value, "lesson", "Failed to update lesson")?;
        if let Some(slot) = self.lessons.iter_mut().find(|l| l.id == id) {
            *slot = lesson.clone();
        }
        self.sort();
        Ok(lesson)
    }

    pub async fn delete<T: Transport, S: SessionStorage>(
        &mut self,
        client: &ApiClient<T, S>,
        id: i64,
    ) -> Result<(), PortalError> {
        let value: Value = client.delete(&endpoints::lesson_delete(id)).await?;
        check_success(&value, "Failed to delete lesson")?;
        self.lessons.retain(|l| l.id != id);
        info!("Deleted lesson {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn make_lesson(id: i64, order: u32) -> Lesson {
        serde_json::from_value(json!({
            "id": id,
            "course": 5,
            "title": format!("Lesson {}", id),
            "order": order,
        }))
        .unwrap()
    }

    fn make_controller() -> LessonController {
        let mut controller = LessonController::new(5);
        controller.set_lessons(vec![make_lesson(1, 3), make_lesson(2, 1), make_lesson(3, 2)]);
        controller
    }

    #[test]
    fn test_lessons_sorted_by_order() {
        let controller = make_controller();
        let ids: Vec<i64> = controller.lessons().iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
        assert_eq!(controller.next_order(), 4);
        assert_eq!(LessonController::new(5).next_order(), 1);
    }

    #[test]
    fn test_duplicate_order_ignores_lesson_being_edited() {
        let controller = make_controller();
        assert!(matches!(
            controller.check_order(2, None),
            Err(PortalError::Validation(_))
        ));
        assert!(controller.check_order(2, Some(3)).is_ok());
        assert!(controller.check_order(2, Some(1)).is_err());
        assert!(controller.check_order(9, None).is_ok());
    }

    #[test]
    fn test_draft_from_form_defaults_order() {
        let draft = LessonDraft::from_form(5, " Intro ", "Short", "Body", "");
        assert_eq!(draft.order, 1);
        assert_eq!(draft.title, "Intro");

        let draft = LessonDraft::from_form(5, "Intro", "", "Body", "2");
        assert_eq!(draft.order, 2);
        assert!(draft.validate().is_err());
    }

    #[test]
    fn test_draft_for_other_course_rejected() {
        let controller = make_controller();
        let draft = LessonDraft::from_form(6, "Intro", "Short", "Body", "9");
        assert!(matches!(
            controller.check_draft(&draft, None),
            Err(PortalError::Validation(_))
        ));
    }
}
