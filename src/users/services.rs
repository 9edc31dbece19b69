use super::dto::UpdateUserRequest;
use super::repo::UserStore;
use super::repo_types::{User, UserHistory};

/// Records one collection event for `user_id`, stamped with the store's clock.
///
/// Called by collection processing rather than over HTTP. Store errors,
/// including an unknown user, are returned to the caller unchanged.
pub async fn add_user_history(
    store: &dyn UserStore,
    user_id: i64,
    address: &str,
    day: &str,
) -> anyhow::Result<UserHistory> {
    let history = store.add_history(user_id, address, day).await?;
    tracing::debug!(user_id, history_id = history.id, "user history added");
    Ok(history)
}

/// Overwrites every editable profile field of `user` with the request's values.
pub fn apply_profile_update(mut user: User, update: UpdateUserRequest) -> User {
    user.name = update.name;
    user.province = update.province;
    user.city = update.city;
    user.district = update.district;
    user.sub_district = update.sub_district;
    user.address = update.address;
    user
}
