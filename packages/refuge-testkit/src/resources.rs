use time::macros::datetime;

use refuge_domain::{
	Resource, ResourceCategory, UrgencyLevel,
	resource::{
		AccessSupport, Availability, ContactInfo, CrisisSupport, QualityMetrics,
	},
};

/// A minimal valid resource: free, English only, standard urgency, walk-in, no hours or
/// coordinates, last updated 2025-01-01.
pub fn basic(id: &str, category: ResourceCategory) -> Resource {
	Resource {
		id: id.to_string(),
		name: format!("Service {id}"),
		description: format!("Support service {id}."),
		category,
		subcategory: None,
		contact: ContactInfo::default(),
		services_provided: Vec::new(),
		languages_available: vec!["English".to_string()],
		cost: "Free".to_string(),
		eligibility: None,
		location: "Canberra, ACT".to_string(),
		coordinates: None,
		urgency_level: UrgencyLevel::Standard,
		keywords: Vec::new(),
		last_updated: datetime!(2025-01-01 00:00 UTC),
		opening_hours: None,
		availability: Availability::default(),
		quality: QualityMetrics::default(),
		access: AccessSupport::default(),
		crisis: CrisisSupport::default(),
		confidential: false,
		data_quality: None,
	}
}

pub fn legal_aid() -> Resource {
	let mut resource = basic("legal_001", ResourceCategory::LegalAid);

	resource.name = "Legal Aid ACT".to_string();
	resource.description =
		"Free legal advice for visa, immigration and family law matters.".to_string();
	resource.contact = ContactInfo {
		phone: Some("1300 654 314".to_string()),
		website: Some("https://www.legalaidact.org.au".to_string()),
		address: Some("2 Allsop Street, Canberra City ACT 2601".to_string()),
		hours: Some("Mon-Fri 8:30am-5pm".to_string()),
		..Default::default()
	};
	resource.services_provided =
		["Visa advice", "Family law", "Tenancy disputes", "Court support"].map(String::from).to_vec();
	resource.languages_available = ["English", "Arabic", "Dari"].map(String::from).to_vec();
	resource.keywords = ["visa", "lawyer", "legal", "immigration"].map(String::from).to_vec();
	resource.quality.verified = true;

	resource
}

pub fn crisis_line() -> Resource {
	let mut resource = basic("emergency_001", ResourceCategory::EmergencyServices);

	resource.name = "Canberra Crisis Line".to_string();
	resource.description = "24/7 crisis support for people in immediate danger.".to_string();
	resource.contact.phone = Some("13 11 14".to_string());
	resource.contact.hours = Some("24/7".to_string());
	resource.urgency_level = UrgencyLevel::Critical;
	resource.crisis = CrisisSupport { crisis_support: true, after_hours: true };

	resource
}

pub fn shelter() -> Resource {
	let mut resource = basic("housing_001", ResourceCategory::Housing);

	resource.name = "OneLink Housing Support".to_string();
	resource.description = "Emergency accommodation and housing support referrals.".to_string();
	resource.contact.phone = Some("1800 176 468".to_string());
	resource.urgency_level = UrgencyLevel::High;
	resource.keywords = ["homeless", "shelter", "rent"].map(String::from).to_vec();

	resource
}

pub fn workers_rights() -> Resource {
	let mut resource = basic("legal_004", ResourceCategory::LegalAid);

	resource.name = "Migrant Workers Centre".to_string();
	resource.description = "Confidential help with wage theft and unsafe work.".to_string();
	resource.confidential = true;
	resource.urgency_level = UrgencyLevel::High;

	resource
}

pub fn english_classes() -> Resource {
	let mut resource = basic("education_001", ResourceCategory::LanguageLearning);

	resource.name = "Adult Migrant English Program".to_string();
	resource.description = "Free English classes for eligible migrants.".to_string();
	resource.data_quality = Some(0.9);

	resource
}

pub fn low_quality_clinic() -> Resource {
	let mut resource = basic("health_009", ResourceCategory::Healthcare);

	resource.name = "Unverified Clinic".to_string();
	resource.data_quality = Some(0.3);

	resource
}

/// A small directory spanning urgencies and categories.
pub fn sample_directory() -> Vec<Resource> {
	vec![
		legal_aid(),
		crisis_line(),
		shelter(),
		workers_rights(),
		english_classes(),
		low_quality_clinic(),
	]
}
