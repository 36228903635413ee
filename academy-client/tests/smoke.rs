use academy_client::{AcademyClient, AcademyClientError, ImageFile, PostFilter, PostInput, PostPatch};

#[tokio::test]
#[ignore = "requires running academy-server"]
async fn http_smoke_flow() {
    let base_url =
        std::env::var("ACADEMY_HTTP_URL").unwrap_or_else(|_| "http://127.0.0.1:8080".to_string());
    let username = std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());
    let password = std::env::var("ADMIN_PASSWORD").expect("ADMIN_PASSWORD must be set");
    let mut client = AcademyClient::new(base_url).expect("client");

    let login = client
        .login(&username, &password)
        .await
        .expect("login must succeed");
    assert!(!login.access_token.is_empty());
    assert!(client.get_token().is_some());

    let input = PostInput {
        title: "smoke title".to_string(),
        content: "smoke content".to_string(),
        tags: vec!["smoke".to_string()],
        ..PostInput::default()
    };
    let image = ImageFile {
        file_name: "dot.png".to_string(),
        content_type: "image/png".to_string(),
        bytes: vec![1, 2, 3],
    };
    let created = client
        .create_post(input, Some(image))
        .await
        .expect("create_post must succeed");
    assert!(!created.published);
    assert_eq!(created.image_url, "data:image/png;base64,AQID");

    let fetched = client
        .get_post(&created.id)
        .await
        .expect("get_post must succeed");
    assert_eq!(fetched, created);

    let filter = PostFilter {
        tag: Some("SMOKE".to_string()),
        ..PostFilter::default()
    };
    let listed = client
        .list_posts(&filter)
        .await
        .expect("list_posts must succeed");
    assert!(listed.posts.iter().any(|post| post.id == created.id));

    let patch = PostPatch {
        title: Some("smoke title updated".to_string()),
        ..PostPatch::default()
    };
    let updated = client
        .update_post(&created.id, patch, None)
        .await
        .expect("update_post must succeed");
    assert_eq!(updated.title, "smoke title updated");
    assert_eq!(updated.content, "smoke content");
    assert_eq!(updated.created_at, created.created_at);

    let published = client
        .toggle_publish(&created.id)
        .await
        .expect("toggle_publish must succeed");
    assert!(published.published);

    let uploaded = client
        .upload_image(ImageFile {
            file_name: "logo.gif".to_string(),
            content_type: "image/gif".to_string(),
            bytes: b"GIF89a".to_vec(),
        })
        .await
        .expect("upload must succeed");
    assert!(uploaded.url.ends_with(".gif"));

    client
        .delete_post(&created.id)
        .await
        .expect("delete_post must succeed");
    client
        .delete_post(&created.id)
        .await
        .expect("second delete is a no-op");

    let after_delete = client.get_post(&created.id).await;
    assert!(matches!(after_delete, Err(AcademyClientError::NotFound)));
}
