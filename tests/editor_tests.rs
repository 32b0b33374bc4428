use chrono::{TimeZone, Utc};
use passportify_cms::{
    InMemoryRepository,
    content::{PageContent, SectionKind},
    editor::{
        ComponentDraft, FieldInput, PageEditor, blog_post_write, case_study_write,
        publication_stamp, section_form, setting_write, slugify, split_tags,
    },
    error::{AppError, RepositoryError},
    models::{
        BlogPostInput, CaseStudyInput, Component, ComponentInput, PageInput, PublishStatus,
        SiteSettingInput,
    },
    repository::Repository,
};
use serde_json::json;
use uuid::Uuid;

// --- Text Helpers ---

#[test]
fn test_slugify() {
    assert_eq!(slugify("Hello World"), "hello-world");
    assert_eq!(slugify("  Digital   Product Passports! "), "-digital-product-passports-");
    assert_eq!(slugify("EU DPP -- 2027 Rules"), "eu-dpp-2027-rules");
    assert_eq!(slugify("Café & Co."), "caf-co");
    assert_eq!(slugify(""), "");
}

#[test]
fn test_split_tags_drops_blanks() {
    assert_eq!(
        split_tags(" compliance, ,textiles ,, batteries "),
        vec!["compliance", "textiles", "batteries"]
    );
    assert!(split_tags("").is_empty());
    assert!(split_tags(" , ").is_empty());
}

#[test]
fn test_publication_stamp_only_for_published() {
    let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();

    assert_eq!(publication_stamp(PublishStatus::Published, now), Some(now));
    assert_eq!(publication_stamp(PublishStatus::Draft, now), None);
    assert_eq!(publication_stamp(PublishStatus::Archived, now), None);
}

// --- Write Builders ---

#[test]
fn test_blog_post_write_derives_slug_and_tags() {
    let now = Utc::now();
    let write = blog_post_write(
        BlogPostInput {
            title: "Battery Passports Explained".to_string(),
            tags: "batteries, regulation".to_string(),
            status: PublishStatus::Published,
            ..BlogPostInput::default()
        },
        now,
    );

    assert_eq!(write.slug, "battery-passports-explained");
    assert_eq!(write.tags, vec!["batteries", "regulation"]);
    assert_eq!(write.published_at, Some(now));
}

#[test]
fn test_explicit_slug_is_kept() {
    let write = case_study_write(
        CaseStudyInput {
            title: "Acme Textiles".to_string(),
            slug: "acme".to_string(),
            ..CaseStudyInput::default()
        },
        Utc::now(),
    );

    assert_eq!(write.slug, "acme");
    assert_eq!(write.status, PublishStatus::Draft);
    assert_eq!(write.published_at, None);
}

#[test]
fn test_setting_value_is_json_or_plain_string() {
    let json_value = setting_write(SiteSettingInput {
        key: "hero".to_string(),
        value_text: r#"{"headline": "Hi"}"#.to_string(),
        description: String::new(),
    });
    assert_eq!(json_value.value, json!({ "headline": "Hi" }));

    let plain = setting_write(SiteSettingInput {
        key: "support_email".to_string(),
        value_text: "support@passportify.test".to_string(),
        description: String::new(),
    });
    assert_eq!(plain.value, json!("support@passportify.test"));
}

// --- Section Forms ---

#[test]
fn test_section_forms_by_type() {
    let mut content = PageContent::default();
    content.add_section(SectionKind::Hero);
    content.add_section(SectionKind::Text);
    content.add_section(SectionKind::Cta);
    content.add_section(SectionKind::Stats);

    let names = |index: usize| -> Vec<String> {
        section_form(&content.sections[index])
            .fields
            .into_iter()
            .map(|f| f.name)
            .collect()
    };

    assert_eq!(
        names(0),
        vec!["title", "subtitle", "description", "buttonText", "buttonLink"]
    );
    assert_eq!(names(1), vec!["title", "body"]);
    assert_eq!(names(2), vec!["title", "description", "buttonText", "buttonLink"]);
    assert_eq!(names(3), vec!["title", "content"]);

    let stats = section_form(&content.sections[3]);
    assert_eq!(stats.kind, "stats");
    assert_eq!(stats.fields[1].input, FieldInput::Json);
    let parsed: serde_json::Value = serde_json::from_str(&stats.fields[1].value).unwrap();
    assert_eq!(parsed, json!({ "items": [{ "value": "", "label": "" }] }));

    let hero = section_form(&content.sections[0]);
    assert_eq!(hero.fields[2].input, FieldInput::Textarea);
    assert_eq!(hero.fields[3].value, "Get Started");
}

#[test]
fn test_custom_section_form_shows_raw_json() {
    let mut content = PageContent::default();
    content.add_section(SectionKind::parse("custom"));

    let form = section_form(&content.sections[0]);

    assert_eq!(form.kind, "custom");
    assert_eq!(form.fields.len(), 2);
    assert_eq!(form.fields[1].value, "{}");
}

// --- Components ---

#[test]
fn test_component_draft_ignores_invalid_json_text() {
    let stored = Component {
        id: Uuid::new_v4(),
        name: "Pricing".to_string(),
        component_type: "table".to_string(),
        content: json!({ "rows": 3 }),
        props: json!({ "striped": true }),
        ..Component::default()
    };
    let mut draft = ComponentDraft::from_component(&stored);

    let ignored = draft.apply_input(ComponentInput {
        name: "Pricing v2".to_string(),
        component_type: "table".to_string(),
        content_text: Some("{ \"rows\": ".to_string()),
        props_text: Some(r#"{"striped": false}"#.to_string()),
    });

    assert!(ignored.content);
    assert!(!ignored.props);
    let write = draft.to_write();
    assert_eq!(write.name, "Pricing v2");
    assert_eq!(write.content, json!({ "rows": 3 }));
    assert_eq!(write.props, json!({ "striped": false }));
}

#[test]
fn test_new_component_defaults_to_empty_objects() {
    let mut draft = ComponentDraft::new();
    let ignored = draft.apply_input(ComponentInput {
        name: "Badge".to_string(),
        component_type: "badge".to_string(),
        content_text: None,
        props_text: None,
    });

    assert!(!ignored.content && !ignored.props);
    let write = draft.to_write();
    assert_eq!(write.content, json!({}));
    assert_eq!(write.props, json!({}));
}

// --- Page Editor ---

#[tokio::test]
async fn test_page_editor_create_then_update() {
    let repo = InMemoryRepository::new();
    let actor = Uuid::new_v4();

    let mut editor = PageEditor::new_draft();
    assert_eq!(editor.status, PublishStatus::Draft);
    editor.apply_input(PageInput {
        slug: "home".to_string(),
        title: "Home".to_string(),
        ..PageInput::default()
    });
    editor.content.add_section(SectionKind::Hero);

    let created = editor.save(&repo, actor).await.unwrap();
    assert_eq!(editor.id(), Some(created.id));
    assert_eq!(created.created_by, Some(actor));
    assert_eq!(created.content.sections.len(), 1);
    assert!(created.published_at.is_none());

    // Metadata-only input keeps the stored sections.
    editor.apply_input(PageInput {
        slug: "home".to_string(),
        title: "Home".to_string(),
        status: PublishStatus::Published,
        ..PageInput::default()
    });
    let published = editor.save(&repo, actor).await.unwrap();
    assert_eq!(published.id, created.id);
    assert_eq!(published.content.sections.len(), 1);
    let first_stamp = published.published_at.expect("published pages are stamped");

    // Moving back to draft keeps the timestamp.
    editor.status = PublishStatus::Draft;
    let drafted = editor.save(&repo, actor).await.unwrap();
    assert_eq!(drafted.published_at, Some(first_stamp));
}

#[tokio::test]
async fn test_page_editor_load_missing_page() {
    let repo = InMemoryRepository::new();

    let result = PageEditor::load(&repo, Uuid::new_v4()).await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_failed_save_leaves_stored_page_untouched() {
    let repo = InMemoryRepository::new();
    let actor = Uuid::new_v4();
    let mut editor = PageEditor::new_draft();
    editor.apply_input(PageInput {
        slug: "about".to_string(),
        title: "About".to_string(),
        ..PageInput::default()
    });
    let stored = editor.save(&repo, actor).await.unwrap();

    editor.title = "About us".to_string();
    repo.set_failing(true);
    assert!(editor.save(&repo, actor).await.is_err());
    repo.set_failing(false);

    let reread = repo.get_page(stored.id).await.unwrap().unwrap();
    assert_eq!(reread.title, "About");
}

#[tokio::test]
async fn test_duplicate_slug_is_a_conflict() {
    let repo = InMemoryRepository::new();
    let actor = Uuid::new_v4();
    let input = PageInput {
        slug: "pricing".to_string(),
        title: "Pricing".to_string(),
        ..PageInput::default()
    };

    let mut first = PageEditor::new_draft();
    first.apply_input(input.clone());
    first.save(&repo, actor).await.unwrap();

    let mut second = PageEditor::new_draft();
    second.apply_input(input);
    let result = second.save(&repo, actor).await;

    assert!(matches!(
        result,
        Err(AppError::Database(RepositoryError::Conflict(_)))
    ));
    assert_eq!(repo.list_pages().await.unwrap().len(), 1);
}
