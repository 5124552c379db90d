use std::collections::HashMap;

use crate::error::NotificationError;

/// Rendered notification content, ready to address to recipients.
#[derive(Debug, Clone)]
pub struct RenderedContent {
    pub subject: Option<String>,
    pub body: String,
    pub html_body: Option<String>,
}

/// Simple template renderer using {{variable}} syntax.
pub struct TemplateRenderer {
    templates: HashMap<String, Template>,
}

#[derive(Debug, Clone)]
pub struct Template {
    pub id: String,
    pub subject: Option<String>,
    pub body: String,
    pub html_body: Option<String>,
}

/// Template id for the "new event" broadcast email.
pub const EVENT_CREATED: &str = "event-created";
/// Template id for the "event updated" email sent to registrants.
pub const EVENT_UPDATED: &str = "event-updated";
/// Template id for the registration confirmation email.
pub const REGISTRATION_CONFIRMED: &str = "registration-confirmed";

impl TemplateRenderer {
    pub fn new() -> Self {
        Self {
            templates: HashMap::new(),
        }
    }

    /// Renderer preloaded with the built-in event and registration templates.
    pub fn with_defaults() -> Self {
        let mut renderer = Self::new();
        renderer.register(Template {
            id: EVENT_CREATED.to_string(),
            subject: Some("New Event: {{title}}".to_string()),
            body: "A new event \"{{title}}\" has been added.\n\n\
                   Date: {{date}}\nTime: {{time}}\nLocation: {{location}}\n"
                .to_string(),
            html_body: None,
        });
        renderer.register(Template {
            id: EVENT_UPDATED.to_string(),
            subject: Some("Event Updated: {{title}}".to_string()),
            body: "The event \"{{title}}\" has been updated.\n\n\
                   New Details:\nDate: {{date}}\nTime: {{time}}\nLocation: {{location}}\n"
                .to_string(),
            html_body: None,
        });
        renderer.register(Template {
            id: REGISTRATION_CONFIRMED.to_string(),
            subject: Some("Registration Confirmed: {{event_title}}".to_string()),
            body: "Hi {{user_name}},\n\n\
                   You have successfully registered for \"{{event_title}}\".\n\n\
                   You will receive updates if anything changes.\n\n\
                   - CampusConnect Team\n"
                .to_string(),
            html_body: None,
        });
        renderer
    }

    pub fn register(&mut self, template: Template) {
        self.templates.insert(template.id.clone(), template);
    }

    pub fn get(&self, template_id: &str) -> Option<&Template> {
        self.templates.get(template_id)
    }

    pub fn render(
        &self,
        template_id: &str,
        data: &HashMap<String, serde_json::Value>,
    ) -> Result<RenderedContent, NotificationError> {
        let template = self
            .templates
            .get(template_id)
            .ok_or(NotificationError::TemplateNotFound(template_id.to_string()))?;

        let subject = template
            .subject
            .as_ref()
            .map(|s| self.render_string(s, data));
        let body = self.render_string(&template.body, data);
        let html_body = template
            .html_body
            .as_ref()
            .map(|s| self.render_string(s, data));

        Ok(RenderedContent {
            subject,
            body,
            html_body,
        })
    }

    fn render_string(&self, template: &str, data: &HashMap<String, serde_json::Value>) -> String {
        let mut result = template.to_string();

        for (key, value) in data {
            let placeholder = format!("{{{{{}}}}}", key);
            let replacement = match value {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                serde_json::Value::Null => String::new(),
                _ => value.to_string(),
            };
            result = result.replace(&placeholder, &replacement);
        }

        result
    }
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_template() {
        let mut renderer = TemplateRenderer::new();
        renderer.register(Template {
            id: "test".to_string(),
            subject: Some("Hello {{name}}".to_string()),
            body: "The event is on {{date}}".to_string(),
            html_body: None,
        });

        let mut data = HashMap::new();
        data.insert("name".to_string(), serde_json::json!("Alice"));
        data.insert("date".to_string(), serde_json::json!("2024-05-01"));

        let result = renderer.render("test", &data).unwrap();
        assert_eq!(result.subject.unwrap(), "Hello Alice");
        assert_eq!(result.body, "The event is on 2024-05-01");
    }

    #[test]
    fn test_template_not_found() {
        let renderer = TemplateRenderer::new();
        let data = HashMap::new();

        let result = renderer.render("nonexistent", &data);
        assert!(matches!(
            result,
            Err(NotificationError::TemplateNotFound(_))
        ));
    }

    #[test]
    fn test_default_event_created_template() {
        let renderer = TemplateRenderer::with_defaults();
        let mut data = HashMap::new();
        data.insert("title".to_string(), serde_json::json!("Hack Night"));
        data.insert("date".to_string(), serde_json::json!("2024-05-01"));
        data.insert("time".to_string(), serde_json::json!("18:00"));
        data.insert("location".to_string(), serde_json::json!("Lab 3"));

        let result = renderer.render(EVENT_CREATED, &data).unwrap();
        assert_eq!(result.subject.unwrap(), "New Event: Hack Night");
        assert!(result.body.contains("\"Hack Night\" has been added"));
        assert!(result.body.contains("Location: Lab 3"));
    }

    #[test]
    fn test_default_registration_template() {
        let renderer = TemplateRenderer::with_defaults();
        let mut data = HashMap::new();
        data.insert("user_name".to_string(), serde_json::json!("Alice"));
        data.insert("event_title".to_string(), serde_json::json!("Hack Night"));

        let result = renderer.render(REGISTRATION_CONFIRMED, &data).unwrap();
        assert_eq!(
            result.subject.unwrap(),
            "Registration Confirmed: Hack Night"
        );
        assert!(result.body.starts_with("Hi Alice,"));
    }
}
