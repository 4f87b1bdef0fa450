use reqwest::Url;
use serde_json::Value;
use tracing_test::traced_test;
use usulan_e2e_tests::{
    extend_url, launch_env, prepare_env,
    rest::{SAMPLE_JPEG, SAMPLE_PNG, create_usulan, image_key, usulan_form, with_image},
};

async fn fetch_image(client: &reqwest::Client, url: &str) -> reqwest::Response {
    client.get(Url::parse(url).unwrap()).send().await.unwrap()
}

#[tokio::test]
#[traced_test]
async fn test_image_replacement() {
    let (args, _config_guard) = prepare_env("test_image_replacement").unwrap();
    let base_url = args.base_url.clone();
    let (client, _server_guard) = launch_env(args).await.unwrap();

    let record = create_usulan(&client, &base_url, "Clean Code", "9780132350884")
        .await
        .unwrap();
    let old_image_url = record["image"].as_str().unwrap().to_string();
    assert!(old_image_url.ends_with(".jpg"));

    // stored blob is served back unchanged
    let response = fetch_image(&client, &old_image_url).await;
    assert!(response.status().is_success());
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "image/jpeg"
    );
    assert_eq!(response.bytes().await.unwrap().as_ref(), SAMPLE_JPEG);

    // replace the image on update
    let api_url = base_url.join("usulan-buku").unwrap();
    let record_url = extend_url(&api_url, record["id"].as_i64().unwrap());
    let form = with_image(
        usulan_form("Clean Code", "9780132350884"),
        SAMPLE_PNG,
        "sampul.png",
        "image/png",
    )
    .unwrap();
    let response = client.put(record_url).multipart(form).send().await.unwrap();
    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    let new_image_url = body["data"]["image"].as_str().unwrap().to_string();
    assert_ne!(new_image_url, old_image_url);
    assert_ne!(image_key(&body["data"]), image_key(&record));
    assert!(new_image_url.ends_with(".png"));

    // old blob is gone, new one resolves
    let response = fetch_image(&client, &old_image_url).await;
    assert_eq!(response.status().as_u16(), 404);
    let response = fetch_image(&client, &new_image_url).await;
    assert!(response.status().is_success());
    assert_eq!(response.bytes().await.unwrap().as_ref(), SAMPLE_PNG);
}

#[tokio::test]
#[traced_test]
async fn test_delete_removes_blob() {
    let (args, _config_guard) = prepare_env("test_delete_removes_blob").unwrap();
    let base_url = args.base_url.clone();
    let (client, _server_guard) = launch_env(args).await.unwrap();

    let record = create_usulan(&client, &base_url, "Clean Code", "9780132350884")
        .await
        .unwrap();
    let image_url = record["image"].as_str().unwrap().to_string();

    let api_url = base_url.join("usulan-buku").unwrap();
    let record_url = extend_url(&api_url, record["id"].as_i64().unwrap());
    let response = client.delete(record_url).send().await.unwrap();
    assert!(response.status().is_success());

    let response = fetch_image(&client, &image_url).await;
    assert_eq!(response.status().as_u16(), 404);
}
