//! Shared fixtures for unit tests: a small in-memory world implementing
//! every collaborator seam.

use std::collections::{HashMap, HashSet};

use crate::context::{
    ActivityInfo, CourseInfo, DataSource, Field, FormatOptions, LocaleProvider, PermissionChecker,
    RatingAggregator, RatingInfo, RecordId, RecordInfo, RenderContext, TextFormat, TextFormatter,
    UserId, UserProfile,
};
use crate::error::Result;

pub(crate) struct MockField {
    name: String,
    title: String,
    rendered: String,
    raw: Option<String>,
}

impl Field for MockField {
    fn name(&self) -> &str {
        &self.name
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn render_for_record(&self, _record_id: RecordId, _tag: &str) -> Result<String> {
        Ok(self.rendered.clone())
    }

    fn raw_condition_value(&self, _record_id: RecordId, _tag: &str) -> Result<String> {
        Ok(self.raw.clone().unwrap_or_else(|| self.rendered.clone()))
    }
}

#[derive(Default)]
pub(crate) struct MockData {
    fields: HashMap<String, MockField>,
}

impl DataSource for MockData {
    fn field_by_name(&self, name: &str) -> Option<&dyn Field> {
        self.fields.get(name).map(|f| f as &dyn Field)
    }

    fn record_owner(&self, _record_id: RecordId) -> Result<UserId> {
        Ok(1)
    }

    fn user(&self, _id: UserId) -> Result<UserProfile> {
        Ok(UserProfile::default())
    }
}

#[derive(Default)]
pub(crate) struct MockPerms {
    caps: HashSet<String>,
    groups: HashSet<String>,
    roles: HashSet<String>,
}

impl PermissionChecker for MockPerms {
    fn has_capability(&self, capability: &str) -> bool {
        self.caps.contains(capability)
    }

    fn in_group(&self, name: &str) -> bool {
        self.groups.contains(name)
    }

    fn has_role(&self, name: &str) -> bool {
        self.roles.contains(name)
    }
}

pub(crate) struct StaticLocale {
    lang: String,
}

impl LocaleProvider for StaticLocale {
    fn current_language(&self) -> String {
        self.lang.clone()
    }
}

struct Passthrough;

impl TextFormatter for Passthrough {
    fn format(&self, text: &str, _format: TextFormat, _options: &FormatOptions) -> String {
        text.to_string()
    }
}

struct Tagging;

impl TextFormatter for Tagging {
    fn format(&self, text: &str, format: TextFormat, _options: &FormatOptions) -> String {
        let kind = match format {
            TextFormat::Auto => "auto",
            TextFormat::Plain => "plain",
            TextFormat::Html => "html",
            TextFormat::Markdown => "markdown",
        };
        format!("[{kind}]{text}")
    }
}

pub(crate) struct MockRatings {
    info: RatingInfo,
}

impl RatingAggregator for MockRatings {
    fn aggregate_for_record(&self, _record_id: RecordId) -> String {
        if self.info.values.is_empty() {
            return String::new();
        }
        let sum: i64 = self.info.values.iter().sum();
        format!("Average: {}", sum / self.info.values.len() as i64)
    }

    fn info(&self, _record_id: RecordId) -> Option<RatingInfo> {
        Some(self.info.clone())
    }
}

pub(crate) struct TestWorld {
    pub data: MockData,
    pub perms: MockPerms,
    pub locale: StaticLocale,
    pub formatter: Box<dyn TextFormatter>,
    pub ratings: Option<MockRatings>,
    pub user: UserProfile,
    pub course: CourseInfo,
    pub activity: ActivityInfo,
    pub record: RecordInfo,
    pub field_name: String,
    pub field_title: String,
}

impl TestWorld {
    pub fn new() -> Self {
        TestWorld {
            data: MockData::default(),
            perms: MockPerms::default(),
            locale: StaticLocale {
                lang: "en".to_string(),
            },
            formatter: Box::new(Passthrough),
            ratings: None,
            user: UserProfile::default(),
            course: CourseInfo {
                id: 3,
                url: "https://example.test/course/3".to_string(),
            },
            activity: ActivityInfo {
                id: 11,
                name: "Bird sightings".to_string(),
                intro: "A log of local sightings".to_string(),
                url: "https://example.test/data/11".to_string(),
            },
            record: RecordInfo {
                id: 7,
                url: "https://example.test/record/7".to_string(),
            },
            field_name: "card".to_string(),
            field_title: "Card".to_string(),
        }
    }

    pub fn with_field(self, name: &str, rendered: &str) -> Self {
        self.with_field_titled(name, rendered, &format!("{name} label"))
    }

    pub fn with_field_titled(mut self, name: &str, rendered: &str, title: &str) -> Self {
        self.data.fields.insert(
            name.to_string(),
            MockField {
                name: name.to_string(),
                title: title.to_string(),
                rendered: rendered.to_string(),
                raw: None,
            },
        );
        self
    }

    pub fn with_field_raw(mut self, name: &str, rendered: &str, raw: &str) -> Self {
        self.data.fields.insert(
            name.to_string(),
            MockField {
                name: name.to_string(),
                title: format!("{name} label"),
                rendered: rendered.to_string(),
                raw: Some(raw.to_string()),
            },
        );
        self
    }

    pub fn with_user(mut self, name: &str, value: &str) -> Self {
        self.user.set(name, value);
        self
    }

    pub fn with_capability(mut self, capability: &str) -> Self {
        self.perms.caps.insert(capability.to_string());
        self
    }

    pub fn with_group(mut self, name: &str) -> Self {
        self.perms.groups.insert(name.to_string());
        self
    }

    pub fn with_role(mut self, name: &str) -> Self {
        self.perms.roles.insert(name.to_string());
        self
    }

    pub fn with_ratings(mut self, kind: &str, max: i64, values: Vec<i64>) -> Self {
        self.ratings = Some(MockRatings {
            info: RatingInfo {
                kind: kind.to_string(),
                max,
                values,
            },
        });
        self
    }

    pub fn with_owning_field(mut self, name: &str, title: &str) -> Self {
        self.field_name = name.to_string();
        self.field_title = title.to_string();
        self
    }

    pub fn tagging_formatter(mut self) -> Self {
        self.formatter = Box::new(Tagging);
        self
    }
}

pub(crate) fn ctx(world: &TestWorld) -> RenderContext<'_> {
    RenderContext {
        data: &world.data,
        perms: &world.perms,
        locale: &world.locale,
        formatter: world.formatter.as_ref(),
        ratings: world
            .ratings
            .as_ref()
            .map(|r| r as &dyn RatingAggregator),
        user: world.user.clone(),
        course: world.course.clone(),
        activity: world.activity.clone(),
        record: world.record.clone(),
        template_tag: "list".to_string(),
        field_name: world.field_name.clone(),
        field_title: world.field_title.clone(),
    }
}
