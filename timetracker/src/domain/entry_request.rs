use chrono::NaiveDate;

use crate::{AbsenceLabels, EntryKind, Hours, TimeTrackerError};

/// What the user asked to book, before anything was checked against the portal.
#[derive(Debug, Clone)]
pub struct EntryRequest {
    pub kind: EntryKind,
    pub date: NaiveDate,
    pub hours: Hours,
    pub comment: Option<String>,
    pub project: Option<String>,
    pub category: Option<String>,
    pub task: Option<String>,
    pub focal: Option<String>,
}

/// An [`EntryRequest`] with every label decided. Leave entries get the absence labels
/// for their kind and never a focal point.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryPlan {
    pub kind: EntryKind,
    pub project: String,
    pub category: String,
    pub details: EntryDetails,
}

/// Input of the final submit step.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryDetails {
    pub date: NaiveDate,
    pub hours: Hours,
    pub task: String,
    pub comment: String,
    pub focal: Option<String>,
}

impl EntryRequest {
    pub fn plan(&self, absence: &AbsenceLabels) -> Result<EntryPlan, TimeTrackerError> {
        match self.kind {
            EntryKind::Leave(leave) => {
                let labels = absence.for_kind(leave);
                if self.focal.is_some() {
                    tracing::debug!("Ignoring focal point for leave entry");
                }

                Ok(EntryPlan {
                    kind: self.kind,
                    project: absence.project.clone(),
                    category: labels.category.clone(),
                    details: EntryDetails {
                        date: self.date,
                        hours: self.hours,
                        task: labels.task.clone(),
                        comment: non_empty(&self.comment).unwrap_or_else(|| labels.default_comment.clone()),
                        focal: None,
                    },
                })
            }
            EntryKind::Work => Ok(EntryPlan {
                kind: self.kind,
                project: required(&self.project, "project")?,
                category: required(&self.category, "task category")?,
                details: EntryDetails {
                    date: self.date,
                    hours: self.hours,
                    task: required(&self.task, "task")?,
                    comment: non_empty(&self.comment).ok_or_else(|| {
                        TimeTrackerError::validation("a description of what you did is required")
                    })?,
                    focal: Some(required(&self.focal, "focal point")?),
                },
            }),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn required(value: &Option<String>, what: &str) -> Result<String, TimeTrackerError> {
    non_empty(value).ok_or_else(|| TimeTrackerError::validation(format!("no {} given", what)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LeaveKind;

    fn work_request() -> EntryRequest {
        EntryRequest {
            kind: EntryKind::Work,
            date: NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
            hours: "8".parse().unwrap(),
            comment: Some("Code review".to_string()),
            project: Some("Acme - Web".to_string()),
            category: Some("Development".to_string()),
            task: Some("Coding".to_string()),
            focal: Some("Jane Roe".to_string()),
        }
    }

    #[test]
    fn work_plan_keeps_requested_labels() {
        let plan = work_request().plan(&AbsenceLabels::default()).unwrap();

        assert_eq!(plan.project, "Acme - Web");
        assert_eq!(plan.category, "Development");
        assert_eq!(plan.details.task, "Coding");
        assert_eq!(plan.details.focal.as_deref(), Some("Jane Roe"));
    }

    #[test]
    fn work_plan_requires_text_and_focal() {
        let mut request = work_request();
        request.comment = Some("   ".to_string());
        assert!(matches!(
            request.plan(&AbsenceLabels::default()),
            Err(TimeTrackerError::Validation(_))
        ));

        let mut request = work_request();
        request.focal = None;
        let err = request.plan(&AbsenceLabels::default()).unwrap_err();
        assert_eq!(err.to_string(), "no focal point given");
    }

    #[test]
    fn leave_plan_uses_absence_labels_and_drops_focal() {
        let mut request = work_request();
        request.kind = EntryKind::Leave(LeaveKind::Vacation);
        request.comment = None;

        let plan = request.plan(&AbsenceLabels::default()).unwrap();

        assert_eq!(plan.project, "BairesDev - Absence");
        assert_eq!(plan.category, "Vacations");
        assert_eq!(plan.details.task, "Vacations");
        assert_eq!(plan.details.comment, "Vacations");
        assert_eq!(plan.details.focal, None);
    }

    #[test]
    fn leave_plan_needs_no_text() {
        let request = EntryRequest {
            kind: EntryKind::Leave(LeaveKind::Pto),
            comment: None,
            project: None,
            category: None,
            task: None,
            focal: None,
            ..work_request()
        };

        let plan = request.plan(&AbsenceLabels::default()).unwrap();
        assert_eq!(plan.details.comment, "PTO");
        assert_eq!(plan.category, "National Holiday");
    }
}
