use axum_test::TestServer;
use chrono::Utc;
use image::{ImageFormat, RgbImage};
use jsonwebtoken::{encode, EncodingKey, Header};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use serde_json::{json, Value};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

use crate::core::app::AppContext;
use crate::core::config::{AppConfig, AuthConfig, Config, StorageConfig, SwaggerConfig};
use crate::features::auth::model::SessionClaims;
use crate::features::auth::CredentialStore;

pub const TEST_JWT_SECRET: &str = "test-secret";

pub fn test_config(root: &Path) -> Config {
    let upload_dir = root.join("uploads");
    Config {
        app: AppConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_allowed_origins: vec!["*".to_string()],
            max_request_body_size: 5 * 1024 * 1024,
        },
        auth: AuthConfig {
            jwt_secret: TEST_JWT_SECRET.to_string(),
            token_ttl: Duration::from_secs(7200),
            jwt_leeway: Duration::from_secs(0),
            seed_username: "admin".to_string(),
            seed_password: "password".to_string(),
        },
        storage: StorageConfig {
            converted_dir: upload_dir.join("converted"),
            upload_dir,
        },
        swagger: SwaggerConfig {
            username: None,
            password: None,
            title: "Filedesk API".to_string(),
            version: "test".to_string(),
            description: "test".to_string(),
        },
    }
}

/// Full application on top of a throwaway storage directory
pub struct TestApp {
    pub server: TestServer,
    root: TempDir,
}

impl TestApp {
    /// App with only the seeded `admin` / `password` account
    pub fn new() -> Self {
        Self::with_users(&[("admin", "password")])
    }

    pub fn with_users(users: &[(&str, &str)]) -> Self {
        let root = TempDir::new().unwrap();
        let config = test_config(root.path());
        std::fs::create_dir_all(&config.storage.converted_dir).unwrap();

        let mut credentials = CredentialStore::with_user(users[0].0, users[0].1).unwrap();
        for (username, password) in &users[1..] {
            credentials.add_user(username, password).unwrap();
        }

        let context = AppContext::with_credentials(config, credentials);
        let server = TestServer::new(context.router()).unwrap();

        Self { server, root }
    }

    /// Log in through the API and return the bearer token
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .server
            .post("/api/login")
            .json(&json!({"username": username, "password": password}))
            .await;
        response.assert_status_ok();
        response.json::<Value>()["token"]
            .as_str()
            .unwrap()
            .to_string()
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    pub fn upload_dir(&self) -> PathBuf {
        self.root.path().join("uploads")
    }

    pub fn converted_dir(&self) -> PathBuf {
        self.upload_dir().join("converted")
    }
}

/// Token signed with the test secret that expired an hour ago
pub fn expired_token(username: &str) -> String {
    let now = Utc::now().timestamp();
    let claims = SessionClaims {
        username: username.to_string(),
        iat: now - 3 * 3600,
        exp: now - 3600,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, 128])
    })
}

pub fn sample_png(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    gradient(width, height)
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

pub fn sample_jpeg(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    gradient(width, height)
        .write_to(&mut buf, ImageFormat::Jpeg)
        .unwrap();
    buf.into_inner()
}

/// PDF with one page per entry, each showing that text in Courier
pub fn sample_pdf(pages: &[&str]) -> Vec<u8> {
    build_pdf(pages, None)
}

pub fn sample_pdf_with_info(pages: &[&str], title: &str, author: &str) -> Vec<u8> {
    build_pdf(pages, Some((title, author)))
}

fn build_pdf(texts: &[&str], info: Option<(&str, &str)>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in texts {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![50.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    let pages = dictionary! {
        "Type" => "Pages",
        "Count" => kids.len() as i64,
        "Kids" => kids,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    if let Some((title, author)) = info {
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(title),
            "Author" => Object::string_literal(author),
        });
        doc.trailer.set("Info", info_id);
    }

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}
