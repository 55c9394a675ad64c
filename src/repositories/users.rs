use bson::doc;
use mongodb::results::UpdateResult;
use mongodb::{Collection, Database};

use crate::db::models::{User, UserProfile};
use crate::db::types::UserRole;
use crate::db::USERS;

fn collection(db: &Database) -> Collection<User> {
    db.collection::<User>(USERS)
}

pub(crate) async fn insert(db: &Database, user: &User) -> Result<(), mongodb::error::Error> {
    collection(db).insert_one(user, None).await?;
    Ok(())
}

pub(crate) async fn insert_many(
    db: &Database,
    users: &[User],
) -> Result<usize, mongodb::error::Error> {
    let result = collection(db).insert_many(users, None).await?;
    Ok(result.inserted_ids.len())
}

pub(crate) async fn find_by_email(
    db: &Database,
    email: &str,
) -> Result<Option<User>, mongodb::error::Error> {
    collection(db).find_one(doc! { "email": email }, None).await
}

pub(crate) async fn find_by_user_id(
    db: &Database,
    user_id: &str,
) -> Result<Option<User>, mongodb::error::Error> {
    collection(db).find_one(doc! { "userId": user_id }, None).await
}

pub(crate) async fn find_with_role(
    db: &Database,
    user_id: &str,
    role: UserRole,
) -> Result<Option<User>, mongodb::error::Error> {
    collection(db).find_one(doc! { "userId": user_id, "role": role.as_str() }, None).await
}

pub(crate) async fn find_active_student(
    db: &Database,
    user_id: &str,
) -> Result<Option<User>, mongodb::error::Error> {
    collection(db)
        .find_one(
            doc! { "userId": user_id, "role": UserRole::Student.as_str(), "isActive": true },
            None,
        )
        .await
}

pub(crate) async fn set_profile(
    db: &Database,
    user_id: &str,
    profile: &UserProfile,
) -> Result<UpdateResult, mongodb::error::Error> {
    let profile = bson::to_bson(profile)?;
    collection(db)
        .update_one(doc! { "userId": user_id }, doc! { "$set": { "profile": profile } }, None)
        .await
}

pub(crate) async fn set_active(
    db: &Database,
    user_id: &str,
    is_active: bool,
) -> Result<UpdateResult, mongodb::error::Error> {
    collection(db)
        .update_one(doc! { "userId": user_id }, doc! { "$set": { "isActive": is_active } }, None)
        .await
}

pub(crate) async fn delete_by_user_id(
    db: &Database,
    user_id: &str,
) -> Result<u64, mongodb::error::Error> {
    let result = collection(db).delete_one(doc! { "userId": user_id }, None).await?;
    Ok(result.deleted_count)
}
