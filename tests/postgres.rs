use dotenv::dotenv;
use uuid::Uuid;

use todo_api::models::{Email, Task, TaskId, User, UserId};
use todo_api::store::{PgStore, Store, USERS_EMAIL_KEY};

async fn connect() -> PgStore {
    dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    let store = PgStore::connect(&database_url, 2)
        .await
        .expect("Failed to connect to test DB");
    store.provision().await.expect("Failed to provision schema");
    store
}

fn user(email: &str) -> User {
    User {
        id: UserId::generate(),
        email: Email::from(email),
        password_hash: "not-a-real-hash".to_string(),
    }
}

#[actix_rt::test]
#[ignore = "needs a PostgreSQL database in DATABASE_URL"]
async fn test_postgres_unit_of_work() {
    let store = connect().await;
    let email = format!("{}@pg.test", Uuid::new_v4());
    let alice = user(&email);

    // uncommitted writes are discarded
    let mut uow = store.begin().await.unwrap();
    uow.insert_user(&alice).await.unwrap();
    drop(uow);
    let mut uow = store.begin().await.unwrap();
    assert!(uow.user_by_email(&alice.email).await.unwrap().is_none());
    uow.commit().await.unwrap();

    let mut uow = store.begin().await.unwrap();
    uow.insert_user(&alice).await.unwrap();
    let task = Task::new(TaskId::generate(), alice.id.clone(), "buy milk");
    uow.insert_task(&task).await.unwrap();
    uow.commit().await.unwrap();

    // the email constraint is reported by name
    let mut uow = store.begin().await.unwrap();
    let err = uow.insert_user(&user(&email)).await.unwrap_err();
    assert!(err.violates(USERS_EMAIL_KEY), "{:?}", err);
    uow.rollback().await.unwrap();

    let mut uow = store.begin().await.unwrap();
    let tasks = uow.user_tasks(&alice.id).await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].content, "buy milk");
    assert!(!tasks[0].completed);
    assert_eq!(uow.update_task_status(&task.id, true).await.unwrap(), 1);

    uow.delete_user(&alice.id).await.unwrap();
    uow.delete_user_sessions(&alice.id).await.unwrap();
    assert_eq!(uow.delete_user_tasks(&alice.id).await.unwrap(), 1);
    uow.commit().await.unwrap();

    let mut uow = store.begin().await.unwrap();
    assert!(uow.user_by_email(&alice.email).await.unwrap().is_none());
    uow.commit().await.unwrap();
}
