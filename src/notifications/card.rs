use crate::models::{StatusColor, TestRunSummary, NOTIFICATION_KIND};
use serde::{Deserialize, Serialize};

pub const MESSAGE_TYPE: &str = "message";
pub const ADAPTIVE_CARD_CONTENT_TYPE: &str = "application/vnd.microsoft.card.adaptive";
pub const ADAPTIVE_CARD_SCHEMA: &str = "http://adaptivecards.io/schemas/adaptive-card.json";
pub const ADAPTIVE_CARD_VERSION: &str = "1.2";

/// Envelope accepted by Teams incoming webhooks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamsMessage {
    #[serde(rename = "type")]
    pub message_type: String,
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(rename = "contentType")]
    pub content_type: String,
    pub content: AdaptiveCard,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveCard {
    #[serde(rename = "$schema")]
    pub schema: String,
    #[serde(rename = "type")]
    pub card_type: String,
    pub version: String,
    pub body: Vec<CardElement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CardElement {
    TextBlock {
        text: String,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        size: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        weight: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        wrap: Option<bool>,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        spacing: Option<String>,
    },
    FactSet {
        facts: Vec<Fact>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    pub title: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub color: Option<StatusColor>,
}

impl Fact {
    fn new(title: &str, value: &str) -> Self {
        Self {
            title: title.to_string(),
            value: value.to_string(),
            color: None,
        }
    }
}

impl TeamsMessage {
    /// Wrap a single Adaptive Card
    pub fn with_card(card: AdaptiveCard) -> Self {
        Self {
            message_type: MESSAGE_TYPE.to_string(),
            attachments: vec![Attachment {
                content_type: ADAPTIVE_CARD_CONTENT_TYPE.to_string(),
                content: card,
            }],
        }
    }

    /// Card for a test run: title, facts, then a link back to qTest
    pub fn for_test_run(summary: &TestRunSummary) -> Self {
        let body = vec![
            CardElement::TextBlock {
                text: NOTIFICATION_KIND.to_string(),
                size: Some("Medium".to_string()),
                weight: Some("Bolder".to_string()),
                wrap: None,
                spacing: None,
            },
            CardElement::FactSet {
                facts: vec![
                    Fact::new("Project Name:", &summary.project_name),
                    Fact::new("Test Suite Name:", &summary.test_suite_name),
                    Fact::new("Test Run Name:", &summary.test_run_name),
                    Fact {
                        color: Some(summary.status_color),
                        ..Fact::new("Test Log Status:", &summary.status)
                    },
                ],
            },
            CardElement::TextBlock {
                text: format!(
                    "[Click here to view the Test Run in qTest]({})",
                    summary.test_run_url
                ),
                size: None,
                weight: None,
                wrap: Some(true),
                spacing: Some("Medium".to_string()),
            },
        ];

        Self::with_card(AdaptiveCard {
            schema: ADAPTIVE_CARD_SCHEMA.to_string(),
            card_type: "AdaptiveCard".to_string(),
            version: ADAPTIVE_CARD_VERSION.to_string(),
            body,
        })
    }

    /// The card carried by the first attachment
    pub fn card(&self) -> Option<&AdaptiveCard> {
        self.attachments.first().map(|a| &a.content)
    }
}

impl AdaptiveCard {
    /// All facts of all fact sets, in order
    pub fn facts(&self) -> impl Iterator<Item = &Fact> {
        self.body.iter().flat_map(|element| match element {
            CardElement::FactSet { facts } => facts.as_slice(),
            CardElement::TextBlock { .. } => &[][..],
        })
    }
}
