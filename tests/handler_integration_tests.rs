use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use passportify_cms::{
    AppState, InMemoryRepository, MockAuthProvider,
    auth::CurrentSession,
    config::AppConfig,
    content::{Direction, SectionKind, SectionPatch},
    error::AppError,
    guard::AdminActor,
    handlers,
    models::{
        BlogPostInput, ComponentInput, ContactStatus, ContactSubmissionInput, ContactTriageUpdate,
        MoveSectionRequest, NewSectionRequest, PageInput, PublishStatus, RawSectionJson, Role,
        RoleAssignment, SignInRequest, SignUpRequest, SiteSettingInput,
    },
    repository::{Repository, RepositoryState},
    supabase::AuthProviderState,
};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

// --- Test Scaffolding ---

struct Harness {
    state: AppState,
    repo: Arc<InMemoryRepository>,
    actor: AdminActor,
}

fn harness_with(provider: MockAuthProvider) -> Harness {
    let actor_id = Uuid::new_v4();
    let repo = Arc::new(InMemoryRepository::new().with_role(actor_id, Role::Admin));
    let state = AppState::new(
        repo.clone() as RepositoryState,
        Arc::new(provider) as AuthProviderState,
        AppConfig::default(),
    );
    Harness {
        state,
        repo,
        actor: AdminActor {
            id: actor_id,
            email: "admin@passportify.test".to_string(),
            role: Role::Admin,
        },
    }
}

fn harness() -> Harness {
    harness_with(MockAuthProvider::new())
}

fn page_input(slug: &str) -> PageInput {
    PageInput {
        slug: slug.to_string(),
        title: "Landing".to_string(),
        ..PageInput::default()
    }
}

async fn create_page(h: &Harness, slug: &str) -> passportify_cms::models::Page {
    let (status, Json(page)) = handlers::pages::create_page(
        State(h.state.clone()),
        Extension(h.actor.clone()),
        Json(page_input(slug)),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    page
}

async fn add_section(h: &Harness, page_id: Uuid, kind: &str) -> passportify_cms::models::Page {
    let Json(page) = handlers::sections::add_section(
        State(h.state.clone()),
        Extension(h.actor.clone()),
        Path(page_id),
        Json(NewSectionRequest {
            kind: kind.to_string(),
        }),
    )
    .await
    .unwrap();
    page
}

// --- Pages & Sections ---

#[tokio::test]
async fn test_create_page_starts_empty_and_records_actor() {
    let h = harness();

    let page = create_page(&h, "home").await;

    assert_eq!(page.status, PublishStatus::Draft);
    assert!(page.content.sections.is_empty());
    assert_eq!(page.created_by, Some(h.actor.id));
    assert_eq!(page.updated_by, Some(h.actor.id));
}

#[tokio::test]
async fn test_get_missing_page_is_not_found() {
    let h = harness();

    let result = handlers::pages::get_page(State(h.state.clone()), Path(Uuid::new_v4())).await;

    let response = result.unwrap_err().into_response();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_section_lifecycle_through_handlers() {
    let h = harness();
    let page = create_page(&h, "platform").await;

    add_section(&h, page.id, "hero").await;
    add_section(&h, page.id, "text").await;
    let page = add_section(&h, page.id, "testimonials").await;
    assert_eq!(page.content.sections.len(), 3);
    assert_eq!(
        page.content.sections[2].kind(),
        SectionKind::Custom("testimonials".to_string())
    );

    let hero_id = page.content.sections[0].id.clone();
    let text_id = page.content.sections[1].id.clone();

    // Update
    let Json(page) = handlers::sections::update_section(
        State(h.state.clone()),
        Extension(h.actor.clone()),
        Path((page.id, hero_id.clone())),
        Json(SectionPatch {
            title: Some("Welcome".to_string()),
            content: Some(json!({ "subtitle": "Traceability for every product" })),
        }),
    )
    .await
    .unwrap();
    assert_eq!(page.content.sections[0].title, "Welcome");
    assert_eq!(
        page.content.sections[0].body.to_value()["subtitle"],
        "Traceability for every product"
    );

    // Move
    let Json(page) = handlers::sections::move_section(
        State(h.state.clone()),
        Extension(h.actor.clone()),
        Path((page.id, text_id.clone())),
        Json(MoveSectionRequest {
            direction: Direction::Up,
        }),
    )
    .await
    .unwrap();
    assert_eq!(page.content.sections[0].id, text_id);
    assert_eq!(page.content.sections[0].order, 0);
    assert_eq!(page.content.sections[1].order, 1);

    // Delete
    let Json(page) = handlers::sections::delete_section(
        State(h.state.clone()),
        Extension(h.actor.clone()),
        Path((page.id, hero_id.clone())),
    )
    .await
    .unwrap();
    assert_eq!(page.content.sections.len(), 2);
    assert!(page.content.section(&hero_id).is_none());

    // Persisted, not just returned.
    let stored = h.repo.get_page(page.id).await.unwrap().unwrap();
    assert_eq!(stored.content, page.content);
}

#[tokio::test]
async fn test_invalid_raw_json_keeps_stored_section() {
    let h = harness();
    let page = create_page(&h, "raw").await;
    let page = add_section(&h, page.id, "custom").await;
    let section_id = page.content.sections[0].id.clone();
    let before = h.repo.get_page(page.id).await.unwrap().unwrap();

    let Json(returned) = handlers::sections::replace_section_json(
        State(h.state.clone()),
        Extension(h.actor.clone()),
        Path((page.id, section_id.clone())),
        Json(RawSectionJson {
            text: "{ \"embed\": ".to_string(),
        }),
    )
    .await
    .unwrap();

    assert_eq!(returned.content, before.content);
    assert_eq!(returned.updated_at, before.updated_at);

    let Json(returned) = handlers::sections::replace_section_json(
        State(h.state.clone()),
        Extension(h.actor.clone()),
        Path((page.id, section_id.clone())),
        Json(RawSectionJson {
            text: r#"{"embed": "<video>"}"#.to_string(),
        }),
    )
    .await
    .unwrap();
    assert_eq!(
        returned.content.sections[0].body.to_value(),
        json!({ "embed": "<video>" })
    );
}

#[tokio::test]
async fn test_unknown_section_is_not_found() {
    let h = harness();
    let page = create_page(&h, "about").await;

    let result = handlers::sections::delete_section(
        State(h.state.clone()),
        Extension(h.actor.clone()),
        Path((page.id, "missing".to_string())),
    )
    .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_section_form_handler() {
    let h = harness();
    let page = create_page(&h, "form").await;
    let page = add_section(&h, page.id, "cta").await;
    let section_id = page.content.sections[0].id.clone();

    let Json(form) = handlers::sections::get_section_form(
        State(h.state.clone()),
        Path((page.id, section_id.clone())),
    )
    .await
    .unwrap();

    assert_eq!(form.section_id, section_id);
    assert_eq!(form.kind, "cta");
    assert_eq!(form.fields.len(), 4);
}

#[tokio::test]
async fn test_publish_then_visible_publicly() {
    let h = harness();
    let page = create_page(&h, "pricing").await;

    // Draft pages are not public.
    let hidden = handlers::public::get_published_page(
        State(h.state.clone()),
        Path("pricing".to_string()),
    )
    .await;
    assert!(matches!(hidden, Err(AppError::NotFound(_))));

    let Json(updated) = handlers::pages::update_page(
        State(h.state.clone()),
        Extension(h.actor.clone()),
        Path(page.id),
        Json(PageInput {
            status: PublishStatus::Published,
            ..page_input("pricing")
        }),
    )
    .await
    .unwrap();
    assert!(updated.published_at.is_some());

    let Json(public) = handlers::public::get_published_page(
        State(h.state.clone()),
        Path("pricing".to_string()),
    )
    .await
    .unwrap();
    assert_eq!(public.id, page.id);
}

#[tokio::test]
async fn test_repository_outage_surfaces_as_500() {
    let h = harness();
    h.repo.set_failing(true);

    let result = handlers::pages::list_pages(State(h.state.clone())).await;

    let response = result.unwrap_err().into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

// --- Blog & Components & Settings ---

#[tokio::test]
async fn test_blog_post_create_and_public_listing() {
    let h = harness();

    let (status, Json(post)) = handlers::blog::create_blog_post(
        State(h.state.clone()),
        Extension(h.actor.clone()),
        Json(BlogPostInput {
            title: "What Is a Digital Product Passport".to_string(),
            tags: "dpp, eu".to_string(),
            status: PublishStatus::Published,
            ..BlogPostInput::default()
        }),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(post.slug, "what-is-a-digital-product-passport");
    assert_eq!(post.tags, vec!["dpp", "eu"]);
    assert_eq!(post.author_id, Some(h.actor.id));

    let Json(listed) =
        handlers::public::list_published_blog_posts(State(h.state.clone())).await.unwrap();
    assert_eq!(listed.len(), 1);

    let duplicate = handlers::blog::create_blog_post(
        State(h.state.clone()),
        Extension(h.actor.clone()),
        Json(BlogPostInput {
            title: "What Is a Digital Product Passport".to_string(),
            ..BlogPostInput::default()
        }),
    )
    .await;
    let response = duplicate.unwrap_err().into_response();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_component_update_keeps_content_on_invalid_text() {
    let h = harness();
    let (_, Json(component)) = handlers::components::create_component(
        State(h.state.clone()),
        Extension(h.actor.clone()),
        Json(ComponentInput {
            name: "Logo Wall".to_string(),
            component_type: "logos".to_string(),
            content_text: Some(r#"{"logos": ["acme"]}"#.to_string()),
            props_text: Some("not json".to_string()),
        }),
    )
    .await
    .unwrap();
    assert_eq!(component.content, json!({ "logos": ["acme"] }));
    assert_eq!(component.props, json!({}));

    let Json(updated) = handlers::components::update_component(
        State(h.state.clone()),
        Path(component.id),
        Json(ComponentInput {
            name: "Logo Wall".to_string(),
            component_type: "logos".to_string(),
            content_text: Some("{ broken".to_string()),
            props_text: None,
        }),
    )
    .await
    .unwrap();

    assert_eq!(updated.content, json!({ "logos": ["acme"] }));
}

#[tokio::test]
async fn test_settings_create_and_upsert() {
    let h = harness();

    let blank = handlers::settings::create_setting(
        State(h.state.clone()),
        Extension(h.actor.clone()),
        Json(SiteSettingInput::default()),
    )
    .await;
    assert!(matches!(blank, Err(AppError::BadRequest(_))));

    let (status, Json(setting)) = handlers::settings::create_setting(
        State(h.state.clone()),
        Extension(h.actor.clone()),
        Json(SiteSettingInput {
            key: "footer_note".to_string(),
            value_text: "Made in Europe".to_string(),
            description: String::new(),
        }),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(setting.value, json!("Made in Europe"));
    assert_eq!(setting.updated_by, Some(h.actor.id));

    let Json(saved) = handlers::settings::save_setting(
        State(h.state.clone()),
        Extension(h.actor.clone()),
        Path(setting.id),
        Json(SiteSettingInput {
            key: "footer_note".to_string(),
            value_text: r#"{"text": "Made in Europe", "year": 2026}"#.to_string(),
            description: "Footer".to_string(),
        }),
    )
    .await
    .unwrap();
    assert_eq!(saved.id, setting.id);
    assert_eq!(saved.value["year"], 2026);

    let Json(all) = handlers::settings::list_settings(State(h.state.clone())).await.unwrap();
    assert_eq!(all.len(), 1);
}

// --- Contacts ---

#[tokio::test]
async fn test_contact_submission_and_triage() {
    let h = harness();

    let missing_message = handlers::public::submit_contact(
        State(h.state.clone()),
        Json(ContactSubmissionInput {
            name: "Ada".to_string(),
            email: "ada@acme.test".to_string(),
            message: "   ".to_string(),
            ..ContactSubmissionInput::default()
        }),
    )
    .await;
    assert!(matches!(missing_message, Err(AppError::BadRequest(_))));

    let (status, Json(submission)) = handlers::public::submit_contact(
        State(h.state.clone()),
        Json(ContactSubmissionInput {
            name: "Ada".to_string(),
            email: "ada@acme.test".to_string(),
            company: "Acme".to_string(),
            role: "Head of Compliance".to_string(),
            message: "We need battery passports.".to_string(),
        }),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(submission.status, ContactStatus::New);

    let Json(triaged) = handlers::contacts::triage_contact(
        State(h.state.clone()),
        Path(submission.id),
        Json(ContactTriageUpdate {
            status: ContactStatus::Qualified,
            notes: "Call next week".to_string(),
        }),
    )
    .await
    .unwrap();
    assert_eq!(triaged.status, ContactStatus::Qualified);
    assert_eq!(triaged.notes, "Call next week");
    assert_eq!(triaged.message, "We need battery passports.");

    let Json(stats) = handlers::admin::get_admin_stats(State(h.state.clone())).await.unwrap();
    assert_eq!(stats.total_contacts, 1);
}

// --- Roles ---

#[tokio::test]
async fn test_assign_role_writes_user_roles() {
    let h = harness();
    let target = Uuid::new_v4();

    let status = handlers::admin::assign_role(
        State(h.state.clone()),
        Extension(h.actor.clone()),
        Path(target),
        Json(RoleAssignment { role: Role::Admin }),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(h.repo.get_user_role(target).await.unwrap(), Some(Role::Admin));
}

// --- Auth Handlers ---

#[tokio::test]
async fn test_sign_in_registers_session() {
    let user_id = Uuid::new_v4();
    let h = harness_with(MockAuthProvider::new().with_account(
        user_id,
        "editor@passportify.test",
        "pw",
    ));

    let Json(tokens) = handlers::auth::sign_in(
        State(h.state.clone()),
        Json(SignInRequest {
            email: "editor@passportify.test".to_string(),
            password: "pw".to_string(),
        }),
    )
    .await
    .unwrap();

    assert!(tokens.refresh_token.is_some());
    assert_eq!(tokens.session.user.as_ref().map(|u| u.id), Some(user_id));
    assert!(h.state.sessions.get(&tokens.access_token).await.is_some());
}

#[tokio::test]
async fn test_sign_in_with_bad_password_is_401() {
    let h = harness_with(MockAuthProvider::new().with_account(
        Uuid::new_v4(),
        "editor@passportify.test",
        "pw",
    ));

    let result = handlers::auth::sign_in(
        State(h.state.clone()),
        Json(SignInRequest {
            email: "editor@passportify.test".to_string(),
            password: "wrong".to_string(),
        }),
    )
    .await;

    let response = result.unwrap_err().into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(h.state.sessions.is_empty().await);
}

#[tokio::test]
async fn test_sign_up_needs_confirmation() {
    let h = harness();

    let (status, Json(outcome)) = handlers::auth::sign_up(
        State(h.state.clone()),
        Json(SignUpRequest {
            email: "new@passportify.test".to_string(),
            password: "pw".to_string(),
        }),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::ACCEPTED);
    assert!(outcome.confirmation_required);
    assert!(outcome.session.is_none());
}

#[tokio::test]
async fn test_anonymous_session_view() {
    let Json(view) = handlers::auth::get_session(CurrentSession::anonymous()).await;

    assert!(view.user.is_none());
    assert!(!view.is_admin);
    assert!(!view.loading);
}
