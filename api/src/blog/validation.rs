// Field rules shared by the post and comment submissions. Every check trims
// the value in place first.

pub fn length(field: &str, value: &mut String, min: usize, max: Option<usize>) -> Result<(), String> {
    *value = value.trim().to_string();
    let len = value.chars().count();

    if len < min {
        return Err(format!(
            "{field} must be longer than or equal to {min} characters"
        ));
    }

    if let Some(max) = max {
        if len > max {
            return Err(format!(
                "{field} must be shorter than or equal to {max} characters"
            ));
        }
    }

    Ok(())
}

pub fn email(value: &mut String) -> Result<(), String> {
    *value = value.trim().to_lowercase();

    if value.len() > 254 || !is_email(value) {
        return Err("email must be an email".into());
    }

    Ok(())
}

fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') || value.chars().any(char::is_whitespace) {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
}

pub fn tags(tags: &mut Vec<String>) {
    for tag in tags.iter_mut() {
        *tag = tag.trim().to_string();
    }
}
