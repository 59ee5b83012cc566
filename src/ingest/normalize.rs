use crate::neo4j::UserNode;
use crate::vk::UserProfile;

/// Title-case a string: the first letter of every alphabetic run is upper-cased
/// and the rest lower-cased ("saint-PETERSBURG" -> "Saint-Petersburg").
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

/// Build the stored user node from a fetched profile
pub fn user_node(profile: &UserProfile) -> UserNode {
    UserNode {
        id: profile.id,
        screen_name: profile.screen_name.clone(),
        name: profile.display_name.clone(),
        sex: profile.sex,
        home_town: profile.home_town.as_deref().map(title_case),
        about: profile.about.clone(),
        photo_max: profile.photo_max.clone(),
        followers_count: profile
            .followers_count
            .and_then(|n| i64::try_from(n).ok()),
    }
}
