use futures::TryStreamExt as _;
use sqlx::Executor;
use usulan_dal::{
    Error, ListingParams,
    usulan::{CreateUsulan, UpdateUsulan, UsulanRepositoryImpl},
};

const TEST_DATA: &str = r#"
INSERT INTO usulan_buku (id, judul, isbn, penulis, penerbit, tahun_terbit, kategori, pengusul_email, image, created, modified)
VALUES (1,'Clean Code','9780132350884','Robert C. Martin','Prentice Hall',2008,'Software','a@b.com','aaaa.jpg',datetime('now','-2 days'),datetime('now','-2 days'));
INSERT INTO usulan_buku (id, judul, isbn, penulis, penerbit, tahun_terbit, kategori, pengusul_email, image, created, modified)
VALUES (2,'Refactoring','9780134757599','Martin Fowler','Addison-Wesley',2018,'Software','b@c.com','bbbb.png',datetime('now','-1 day'),datetime('now','-1 day'));

"#;

async fn init_db() -> sqlx::Pool<sqlx::Sqlite> {
    const DB_URL: &str = "sqlite::memory:";
    let conn = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .connect(DB_URL)
        .await
        .unwrap();
    sqlx::migrate!("../../migrations").run(&conn).await.unwrap();

    conn.execute_many(TEST_DATA)
        .try_collect::<Vec<_>>()
        .await
        .unwrap();

    conn
}

fn sample_create(isbn: &str) -> CreateUsulan {
    CreateUsulan {
        judul: "Domain-Driven Design".to_string(),
        isbn: isbn.to_string(),
        penulis: "Eric Evans".to_string(),
        penerbit: "Addison-Wesley".to_string(),
        tahun_terbit: 2003,
        kategori: "Software".to_string(),
        pengusul_email: "c@d.com".to_string(),
        image: "cccc.jpg".to_string(),
    }
}

#[tokio::test]
async fn test_usulan_create_and_get() {
    let conn = init_db().await;
    let repo = UsulanRepositoryImpl::new(conn);

    let created = repo.create(sample_create("9780321125217")).await.unwrap();
    assert_eq!(created.judul, "Domain-Driven Design");
    assert_eq!(created.image, "cccc.jpg");

    let fetched = repo.get(created.id).await.unwrap();
    assert_eq!(fetched.isbn, "9780321125217");
    assert_eq!(fetched.tahun_terbit, 2003);

    let missing = repo.get(999).await;
    assert!(matches!(missing, Err(Error::RecordNotFound(_))));
}

#[tokio::test]
async fn test_isbn_unique_constraint() {
    let conn = init_db().await;
    let repo = UsulanRepositoryImpl::new(conn);

    let err = repo.create(sample_create("9780132350884")).await.unwrap_err();
    assert!(matches!(err, Error::UniqueViolation(ref f) if f == "isbn"));

    // exactly the two seeded records survive
    assert_eq!(repo.count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_isbn_taken() {
    let conn = init_db().await;
    let repo = UsulanRepositoryImpl::new(conn);

    assert!(repo.isbn_taken("9780132350884", None).await.unwrap());
    assert!(!repo.isbn_taken("9780132350884", Some(1)).await.unwrap());
    assert!(repo.isbn_taken("9780132350884", Some(2)).await.unwrap());
    assert!(!repo.isbn_taken("0000000000000", None).await.unwrap());
}

#[tokio::test]
async fn test_usulan_update() {
    let conn = init_db().await;
    let repo = UsulanRepositoryImpl::new(conn);

    let original = repo.get(1).await.unwrap();

    let payload = UpdateUsulan {
        judul: "Clean Code 2nd".to_string(),
        isbn: original.isbn.clone(),
        penulis: original.penulis.clone(),
        penerbit: original.penerbit.clone(),
        tahun_terbit: original.tahun_terbit,
        kategori: original.kategori.clone(),
        pengusul_email: original.pengusul_email.clone(),
        image: None,
    };
    let updated = repo.update(1, payload.clone()).await.unwrap();
    assert_eq!(updated.judul, "Clean Code 2nd");
    // image untouched without a replacement
    assert_eq!(updated.image, original.image);

    let payload = UpdateUsulan {
        image: Some("dddd.gif".to_string()),
        ..payload
    };
    let updated = repo.update(1, payload.clone()).await.unwrap();
    assert_eq!(updated.image, "dddd.gif");

    let err = repo.update(999, payload).await.unwrap_err();
    assert!(matches!(err, Error::RecordNotFound(_)));
}

#[tokio::test]
async fn test_update_isbn_conflict() {
    let conn = init_db().await;
    let repo = UsulanRepositoryImpl::new(conn);

    let original = repo.get(1).await.unwrap();
    let payload = UpdateUsulan {
        judul: original.judul,
        isbn: "9780134757599".to_string(),
        penulis: original.penulis,
        penerbit: original.penerbit,
        tahun_terbit: original.tahun_terbit,
        kategori: original.kategori,
        pengusul_email: original.pengusul_email,
        image: None,
    };
    let err = repo.update(1, payload).await.unwrap_err();
    assert!(matches!(err, Error::UniqueViolation(ref f) if f == "isbn"));
}

#[tokio::test]
async fn test_list_newest_first() {
    let conn = init_db().await;
    let repo = UsulanRepositoryImpl::new(conn);

    let batch = repo.list(ListingParams::default()).await.unwrap();
    assert_eq!(batch.total, 2);
    assert_eq!(batch.rows[0].id, 2);
    assert_eq!(batch.rows[1].id, 1);

    let page = repo.list(ListingParams::new(1, 1)).await.unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.rows.len(), 1);
    assert_eq!(page.rows[0].id, 1);
}

#[tokio::test]
async fn test_usulan_delete() {
    let conn = init_db().await;
    let repo = UsulanRepositoryImpl::new(conn);

    repo.delete(1).await.unwrap();
    assert_eq!(repo.count().await.unwrap(), 1);
    assert!(matches!(repo.get(1).await, Err(Error::RecordNotFound(_))));

    let err = repo.delete(1).await.unwrap_err();
    assert!(matches!(err, Error::RecordNotFound(_)));
}
