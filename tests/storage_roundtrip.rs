use std::sync::{Arc, Mutex};

use signkit::model::{
    BrandingConfig, Category, CustomPpeImage, EmergencyContact, ImageSource, LogoPosition, Ppe,
    QrCodeConfig, QrContentBox, SignageData,
};
use signkit::storage::{keys, FileStore, KeyValueStore, MemoryStore, PersistenceService};

fn full_sign() -> SignageData {
    SignageData {
        title: "Chemical store".into(),
        purpose: "Authorised staff only".into(),
        description: "Corrosive and flammable liquids".into(),
        category: Category::Custom,
        custom_color: Some("oklch(0.6 0.2 30)".into()),
        location: "Warehouse 3".into(),
        hazards: vec!["Corrosive".into(), "Flammable".into()],
        ppe: vec![Ppe::FaceShield, Ppe::Gloves, Ppe::ProtectiveClothing],
        custom_ppe_images: vec![CustomPpeImage {
            image: ImageSource::from_bytes("image/png", b"\x89PNG fake"),
            label: "Apron".into(),
        }],
        procedures: (1..=6).map(|i| format!("Step {}", i)).collect(),
        permit_required: true,
        permit_details: "Permit 7B".into(),
        emergency_contacts: vec![EmergencyContact::new("Spill team", "x4411")],
        qr_code_config: QrCodeConfig {
            content_boxes: vec![QrContentBox { title: "SDS".into(), url: "https://sds.example.com".into() }],
            ..Default::default()
        },
        resolution: 150,
        footer_text: "Reviewed 2024".into(),
        ..Default::default()
    }
}

#[test]
fn saved_sign_reloads_identically() {
    let dir = tempfile::tempdir().unwrap();
    let svc = PersistenceService::new(Arc::new(FileStore::open(dir.path()).unwrap()));
    let sign = full_sign();
    svc.save_draft(&sign).unwrap();

    // a fresh service over the same directory
    let svc = PersistenceService::new(Arc::new(FileStore::open(dir.path()).unwrap()));
    assert_eq!(svc.load_draft().unwrap(), Some(sign));
}

#[test]
fn draft_json_keeps_editor_field_names() {
    let store = Arc::new(MemoryStore::new());
    let svc = PersistenceService::new(store.clone());
    svc.save_draft(&full_sign()).unwrap();
    let raw = store.get("signageDraft").unwrap().unwrap();
    assert!(raw.contains("\"customPPEImages\""));
    assert!(raw.contains("\"qrCodeConfig\""));
    assert!(raw.contains("\"permitRequired\":true"));
}

#[test]
fn branding_subscribers_are_notified() {
    let svc = PersistenceService::new(Arc::new(MemoryStore::new()));
    let seen = Arc::new(Mutex::new(Vec::new()));
    {
        let seen = seen.clone();
        svc.subscribe(&keys::COMPANY_BRANDING, move |b: &BrandingConfig| {
            seen.lock().unwrap().push(b.header_text.clone());
        });
    }
    let branding = BrandingConfig {
        header_text: "ACME Chemicals".into(),
        logo_position: LogoPosition::BottomLeft,
        ..Default::default()
    };
    svc.set_branding(&branding).unwrap();
    assert_eq!(svc.branding().unwrap(), branding);
    assert_eq!(*seen.lock().unwrap(), vec!["ACME Chemicals".to_string()]);
}

#[test]
fn corrupt_draft_is_reported_not_panicking() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("signageDraft.json"), "{\"title\": ").unwrap();
    let svc = PersistenceService::new(Arc::new(FileStore::open(dir.path()).unwrap()));
    let err = svc.load_draft().unwrap_err();
    assert!(err.to_string().contains("signageDraft"));
}
