use reqwest::multipart::{Form, Part};
use reqwest::Client;
use sha2::{Digest, Sha256};

mod common;
use common::utils::{create_test_user, spawn_app};

const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];

fn image_part(bytes: &[u8], file_name: &str, mime: &str) -> Part {
    Part::bytes(bytes.to_vec())
        .file_name(file_name.to_string())
        .mime_str(mime)
        .expect("Invalid mime type")
}

#[tokio::test]
async fn single_png_upload_is_stored_and_served() {
    let test_app = spawn_app().await;
    let client = Client::new();
    let (_, token) = create_test_user();

    let form = Form::new().part("image", image_part(PNG_BYTES, "breakfast.png", "image/png"));
    let response = client
        .post(test_app.url("/api/uploads/image"))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(201, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    let file = &body["files"][0];
    assert_eq!(file["contentType"], "image/png");
    assert_eq!(file["size"], PNG_BYTES.len());
    assert_eq!(file["sha256"], format!("{:x}", Sha256::digest(PNG_BYTES)));

    let url = file["url"].as_str().unwrap();
    assert!(url.starts_with("/media/"), "url was {}", url);

    let served = client.get(test_app.url(url)).send().await.unwrap();
    assert_eq!(200, served.status().as_u16());
    assert_eq!(
        served.headers().get("content-type").and_then(|v| v.to_str().ok()),
        Some("image/png")
    );
    assert_eq!(served.bytes().await.unwrap().as_ref(), PNG_BYTES);
}

#[tokio::test]
async fn pdf_upload_is_rejected() {
    let test_app = spawn_app().await;
    let client = Client::new();
    let (_, token) = create_test_user();

    let form = Form::new().part("image", image_part(b"%PDF-1.4", "report.pdf", "application/pdf"));
    let response = client
        .post(test_app.url("/api/uploads/image"))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(400, response.status().as_u16());
    let error: serde_json::Value = response.json().await.unwrap();
    assert!(error["message"].as_str().unwrap().starts_with("Only"));
}

#[tokio::test]
async fn too_many_files_exceed_the_file_limit() {
    let test_app = spawn_app().await;
    let client = Client::new();
    let (_, token) = create_test_user();

    let mut form = Form::new();
    for i in 0..test_app.upload_limits.max_files + 1 {
        form = form.part("images", image_part(PNG_BYTES, &format!("{}.png", i), "image/png"));
    }

    let response = client
        .post(test_app.url("/api/uploads/images"))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(400, response.status().as_u16());
    let error: serde_json::Value = response.json().await.unwrap();
    assert!(error["message"].as_str().unwrap().contains("File limit exceeded"));
}

#[tokio::test]
async fn file_limit_is_reported_even_when_every_file_is_near_max_size() {
    let test_app = spawn_app().await;
    let client = Client::new();
    let (_, token) = create_test_user();

    // Each file is just under the per-file cap, so the request as a whole
    // is far beyond what a single upload is allowed to carry.
    let near_max = test_app.upload_limits.max_file_size - 100 * 1024;
    let mut image = PNG_BYTES.to_vec();
    image.resize(near_max, 0);

    let mut form = Form::new();
    for i in 0..test_app.upload_limits.max_files + 1 {
        form = form.part("images", image_part(&image, &format!("{}.png", i), "image/png"));
    }

    let response = client
        .post(test_app.url("/api/uploads/images"))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(400, response.status().as_u16());
    let error: serde_json::Value = response.json().await.unwrap();
    let message = error["message"].as_str().unwrap();
    assert!(message.contains("File limit exceeded"), "unexpected message: {}", message);

    let listed = std::fs::read_dir(test_app.media_dir.path()).unwrap().count();
    assert_eq!(listed, 0, "nothing should be stored when the limit is exceeded");
}

#[tokio::test]
async fn oversized_file_in_a_batch_is_rejected() {
    let test_app = spawn_app().await;
    let client = Client::new();
    let (_, token) = create_test_user();

    let mut image = PNG_BYTES.to_vec();
    image.resize(test_app.upload_limits.max_file_size + 1, 0);
    let form = Form::new()
        .part("images", image_part(PNG_BYTES, "small.png", "image/png"))
        .part("images[]", image_part(&image, "huge.png", "image/png"));

    let response = client
        .post(test_app.url("/api/uploads/images"))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(400, response.status().as_u16());
    let error: serde_json::Value = response.json().await.unwrap();
    assert!(error["message"].as_str().unwrap().contains("File too large"));
    assert_eq!(std::fs::read_dir(test_app.media_dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn multiple_images_are_all_stored() {
    let test_app = spawn_app().await;
    let client = Client::new();
    let (_, token) = create_test_user();

    let form = Form::new()
        .part("images", image_part(PNG_BYTES, "a.png", "image/png"))
        .part("images", image_part(b"GIF89a", "b.gif", "image/gif"));

    let response = client
        .post(test_app.url("/api/uploads/images"))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(201, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    let files = body["files"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[1]["contentType"], "image/gif");
    assert!(files[1]["key"].as_str().unwrap().ends_with(".gif"));
}

#[tokio::test]
async fn empty_and_missing_files_are_rejected() {
    let test_app = spawn_app().await;
    let client = Client::new();
    let (_, token) = create_test_user();

    let form = Form::new().part("image", image_part(b"", "empty.png", "image/png"));
    let response = client
        .post(test_app.url("/api/uploads/image"))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(400, response.status().as_u16());

    let form = Form::new().text("note", "no file here");
    let response = client
        .post(test_app.url("/api/uploads/images"))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn unknown_media_key_is_not_found() {
    let test_app = spawn_app().await;
    let client = Client::new();

    let response = client
        .get(test_app.url("/media/does-not-exist.png"))
        .send()
        .await
        .unwrap();

    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn uploads_require_authentication() {
    let test_app = spawn_app().await;
    let client = Client::new();

    let form = Form::new().part("image", image_part(PNG_BYTES, "a.png", "image/png"));
    let response = client
        .post(test_app.url("/api/uploads/image"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(401, response.status().as_u16());
}
