use super::domain::{Category, Priority, Subcategory, TaskInstance};
use super::schedule::{ScheduleRule, ScheduleRules};

#[derive(Debug, Clone)]
pub struct BaselineTaskTemplate {
    pub key: &'static str,
    pub title: &'static str,
    pub category: Category,
    pub subcategory: Option<Subcategory>,
    pub required: bool,
    pub priority: Priority,
    pub schedule: ScheduleRule,
    pub dependencies: Vec<&'static str>,
    pub tags: Vec<&'static str>,
    pub guidance: Vec<&'static str>,
}

impl BaselineTaskTemplate {
    pub fn instantiate(&self) -> TaskInstance {
        TaskInstance {
            id: self.key.to_string(),
            title: self.title.to_string(),
            description: self.guidance.join("\n"),
            category: self.category,
            subcategory: self.subcategory,
            required: self.required,
            priority: self.priority,
            dependencies: self.dependencies.iter().map(|dep| dep.to_string()).collect(),
            tags: self.tags.iter().map(|tag| tag.to_string()).collect(),
            ..TaskInstance::default()
        }
    }
}

/// Scenario-neutral tasks every purchase goes through. Loan-only work is
/// deliberately absent; financing modules in the catalogue add it.
#[derive(Debug)]
pub struct BaselineGenerator {
    templates: Vec<BaselineTaskTemplate>,
}

impl BaselineGenerator {
    pub fn standard() -> Self {
        Self {
            templates: standard_templates(),
        }
    }

    pub fn templates(&self) -> &[BaselineTaskTemplate] {
        &self.templates
    }

    pub fn templates_for(&self, category: Category) -> Vec<&BaselineTaskTemplate> {
        self.templates
            .iter()
            .filter(|template| template.category == category)
            .collect()
    }

    pub fn generate(&self) -> Vec<TaskInstance> {
        self.templates
            .iter()
            .map(BaselineTaskTemplate::instantiate)
            .collect()
    }

    pub fn schedule_rules(&self) -> ScheduleRules {
        self.templates
            .iter()
            .map(|template| (template.key.to_string(), template.schedule))
            .collect()
    }
}

fn standard_templates() -> Vec<BaselineTaskTemplate> {
    use Category::*;

    vec![
        // Search
        BaselineTaskTemplate {
            key: "set-budget",
            title: "Set Purchase Budget",
            category: Search,
            subcategory: None,
            required: true,
            priority: Priority::High,
            schedule: ScheduleRule::from_today(0),
            dependencies: vec![],
            tags: vec!["budget"],
            guidance: vec![
                "Add up down payment, closing costs (typically 2-5% of price), moving costs and a repair reserve.",
                "Decide the monthly housing payment you are comfortable with, not just the maximum a lender would approve.",
            ],
        },
        BaselineTaskTemplate {
            key: "organize-funds",
            title: "Organize Down Payment and Closing Funds",
            category: Search,
            subcategory: None,
            required: true,
            priority: Priority::High,
            schedule: ScheduleRule::from_today(3),
            dependencies: vec!["set-budget"],
            tags: vec!["budget", "funds"],
            guidance: vec![
                "Move funds into one account early so statements show seasoned money.",
                "Document any gift funds with a signed gift letter.",
            ],
        },
        BaselineTaskTemplate {
            key: "choose-buyer-agent",
            title: "Choose a Buyer's Agent",
            category: Search,
            subcategory: None,
            required: true,
            priority: Priority::High,
            schedule: ScheduleRule::from_today(3),
            dependencies: vec![],
            tags: vec!["team"],
            guidance: vec![
                "Interview at least two agents and ask about recent sales in your target area.",
                "Read the buyer representation agreement, including compensation and term.",
            ],
        },
        BaselineTaskTemplate {
            key: "wishlist",
            title: "List Must-Haves and Deal-Breakers",
            category: Search,
            subcategory: None,
            required: false,
            priority: Priority::Medium,
            schedule: ScheduleRule::from_today(5),
            dependencies: vec![],
            tags: vec!["planning"],
            guidance: vec!["Separate true requirements from preferences so showings stay focused."],
        },
        BaselineTaskTemplate {
            key: "neighborhood-research",
            title: "Research Neighborhoods and Commutes",
            category: Search,
            subcategory: None,
            required: false,
            priority: Priority::Medium,
            schedule: ScheduleRule::from_today(10),
            dependencies: vec!["wishlist"],
            tags: vec!["planning"],
            guidance: vec![
                "Drive the commute at rush hour and visit the area at night and on weekends.",
                "Check school boundaries, planned construction and flood maps.",
            ],
        },
        BaselineTaskTemplate {
            key: "tour-homes",
            title: "Tour Homes",
            category: Search,
            subcategory: None,
            required: true,
            priority: Priority::High,
            schedule: ScheduleRule::from_today(14),
            dependencies: vec!["choose-buyer-agent"],
            tags: vec!["showings"],
            guidance: vec![
                "Take notes and photos at each showing; homes blur together quickly.",
                "Look past staging at roof age, HVAC age, water stains and foundation cracks.",
            ],
        },
        // Offer
        BaselineTaskTemplate {
            key: "comparable-sales",
            title: "Review Comparable Sales",
            category: Offer,
            subcategory: None,
            required: true,
            priority: Priority::High,
            schedule: ScheduleRule::from_today(15),
            dependencies: vec!["tour-homes"],
            tags: vec!["pricing"],
            guidance: vec!["Ask your agent for closed sales within the last six months, adjusted for size and condition."],
        },
        BaselineTaskTemplate {
            key: "offer-strategy",
            title: "Decide Offer Price and Terms",
            category: Offer,
            subcategory: None,
            required: true,
            priority: Priority::High,
            schedule: ScheduleRule::from_today(16),
            dependencies: vec!["comparable-sales"],
            tags: vec!["pricing", "negotiation"],
            guidance: vec![
                "Choose price, earnest money amount, contingencies, and the closing date together; they trade off against each other.",
                "Decide your walk-away number before you write the offer.",
            ],
        },
        BaselineTaskTemplate {
            key: "submit-offer",
            title: "Submit Written Offer",
            category: Offer,
            subcategory: None,
            required: true,
            priority: Priority::High,
            schedule: ScheduleRule::from_today(17),
            dependencies: vec!["offer-strategy"],
            tags: vec!["negotiation"],
            guidance: vec!["Confirm the response deadline and how counteroffers will be delivered."],
        },
        // Contract
        BaselineTaskTemplate {
            key: "executed-contract",
            title: "Collect Fully Executed Contract",
            category: Contract,
            subcategory: Some(Subcategory::Legal),
            required: true,
            priority: Priority::High,
            schedule: ScheduleRule::after_acceptance(0),
            dependencies: vec!["submit-offer"],
            tags: vec!["contract"],
            guidance: vec![
                "Make sure every page and addendum is initialed and signed by all parties.",
                "The acceptance date on the executed copy starts every contract deadline.",
            ],
        },
        BaselineTaskTemplate {
            key: "calendar-deadlines",
            title: "Calendar Contract Deadlines",
            category: Contract,
            subcategory: Some(Subcategory::Legal),
            required: true,
            priority: Priority::High,
            schedule: ScheduleRule::after_acceptance(1),
            dependencies: vec!["executed-contract"],
            tags: vec!["contract", "deadline"],
            guidance: vec!["Record inspection, financing, title objection and closing deadlines, noting whether they count calendar or business days."],
        },
        BaselineTaskTemplate {
            key: "open-escrow",
            title: "Confirm Escrow Opened",
            category: Contract,
            subcategory: None,
            required: true,
            priority: Priority::High,
            schedule: ScheduleRule::after_acceptance(1),
            dependencies: vec!["executed-contract"],
            tags: vec!["escrow"],
            guidance: vec!["Get the escrow officer's contact details and the file number for every later communication."],
        },
        BaselineTaskTemplate {
            key: "contingency-removal",
            title: "Remove or Extend Contingencies",
            category: Contract,
            subcategory: Some(Subcategory::Legal),
            required: true,
            priority: Priority::High,
            schedule: ScheduleRule::after_acceptance(17),
            dependencies: vec!["repair-negotiation", "calendar-deadlines"],
            tags: vec!["contract", "deadline"],
            guidance: vec![
                "Deliver written removal or a signed extension before each contingency expires.",
                "Missing a deadline can forfeit the earnest money.",
            ],
        },
        // Due diligence
        BaselineTaskTemplate {
            key: "review-disclosures",
            title: "Review Seller Disclosures",
            category: Diligence,
            subcategory: Some(Subcategory::Legal),
            required: true,
            priority: Priority::High,
            schedule: ScheduleRule::after_acceptance(2),
            dependencies: vec!["executed-contract"],
            tags: vec!["disclosure"],
            guidance: vec!["Flag every 'yes' answer and ask for receipts or permits for past repairs."],
        },
        BaselineTaskTemplate {
            key: "home-inspection",
            title: "Schedule Home Inspection",
            category: Diligence,
            subcategory: Some(Subcategory::Inspection),
            required: true,
            priority: Priority::High,
            schedule: ScheduleRule::after_acceptance(3),
            dependencies: vec!["executed-contract"],
            tags: vec!["inspection"],
            guidance: vec![
                "Book a licensed inspector right away; good inspectors fill up days ahead.",
                "Attend the end of the inspection and ask the inspector to walk you through major findings.",
            ],
        },
        BaselineTaskTemplate {
            key: "inspection-report",
            title: "Read Inspector's Report",
            category: Diligence,
            subcategory: Some(Subcategory::Inspection),
            required: true,
            priority: Priority::High,
            schedule: ScheduleRule::after_acceptance(6),
            dependencies: vec!["home-inspection"],
            tags: vec!["inspection"],
            guidance: vec!["Sort findings into safety, major systems and cosmetic; only the first two belong in a repair request."],
        },
        BaselineTaskTemplate {
            key: "repair-negotiation",
            title: "Negotiate Repairs or Credits",
            category: Diligence,
            subcategory: Some(Subcategory::Inspection),
            required: true,
            priority: Priority::High,
            schedule: ScheduleRule::after_acceptance(8),
            dependencies: vec!["inspection-report"],
            tags: vec!["inspection", "negotiation"],
            guidance: vec![
                "Credits at closing are often simpler than seller-managed repairs.",
                "Get any agreed repairs in a signed amendment with completion and proof requirements.",
            ],
        },
        BaselineTaskTemplate {
            key: "radon-test",
            title: "Test for Radon",
            category: Diligence,
            subcategory: Some(Subcategory::Inspection),
            required: false,
            priority: Priority::Medium,
            schedule: ScheduleRule::after_acceptance(5),
            dependencies: vec!["executed-contract"],
            tags: vec!["inspection", "environmental"],
            guidance: vec!["A 48-hour test at or above 4 pCi/L warrants a mitigation quote."],
        },
        BaselineTaskTemplate {
            key: "pest-inspection",
            title: "Order Termite and Pest Inspection",
            category: Diligence,
            subcategory: Some(Subcategory::Inspection),
            required: false,
            priority: Priority::Medium,
            schedule: ScheduleRule::after_acceptance(5),
            dependencies: vec!["executed-contract"],
            tags: vec!["inspection"],
            guidance: vec!["Common in warm climates; some contracts assign the cost to the seller."],
        },
        BaselineTaskTemplate {
            key: "sewer-scope",
            title: "Scope Sewer Line",
            category: Diligence,
            subcategory: Some(Subcategory::Inspection),
            required: false,
            priority: Priority::Medium,
            schedule: ScheduleRule::after_acceptance(6),
            dependencies: vec!["executed-contract"],
            tags: vec!["inspection"],
            guidance: vec!["Camera the lateral on older homes or where mature trees sit near the line."],
        },
        BaselineTaskTemplate {
            key: "permit-history",
            title: "Check Permit History",
            category: Diligence,
            subcategory: None,
            required: false,
            priority: Priority::Medium,
            schedule: ScheduleRule::after_acceptance(7),
            dependencies: vec!["review-disclosures"],
            tags: vec!["records"],
            guidance: vec!["Compare finished basements, additions and decks against permits on file."],
        },
        BaselineTaskTemplate {
            key: "claims-history",
            title: "Request CLUE Insurance Claims Report",
            category: Diligence,
            subcategory: Some(Subcategory::Insurance),
            required: false,
            priority: Priority::Medium,
            schedule: ScheduleRule::after_acceptance(4),
            dependencies: vec![],
            tags: vec!["insurance", "records"],
            guidance: vec!["Past water or roof claims can raise premiums or make coverage hard to get."],
        },
        BaselineTaskTemplate {
            key: "utility-history",
            title: "Request Utility Cost History",
            category: Diligence,
            subcategory: None,
            required: false,
            priority: Priority::Low,
            schedule: ScheduleRule::after_acceptance(7),
            dependencies: vec![],
            tags: vec!["budget"],
            guidance: vec!["Twelve months of bills show seasonal peaks."],
        },
        BaselineTaskTemplate {
            key: "property-taxes",
            title: "Verify Property Taxes and Assessments",
            category: Diligence,
            subcategory: Some(Subcategory::Title),
            required: true,
            priority: Priority::High,
            schedule: ScheduleRule::after_acceptance(5),
            dependencies: vec![],
            tags: vec!["taxes", "budget"],
            guidance: vec![
                "Taxes often reset on sale; estimate next year's bill from the purchase price, not the seller's bill.",
                "Ask about special assessments or pending improvement districts.",
            ],
        },
        BaselineTaskTemplate {
            key: "survey-review",
            title: "Review Survey or Plat",
            category: Diligence,
            subcategory: Some(Subcategory::Title),
            required: false,
            priority: Priority::Medium,
            schedule: ScheduleRule::after_acceptance(10),
            dependencies: vec!["executed-contract"],
            tags: vec!["title"],
            guidance: vec!["Check fences, driveways and outbuildings against the recorded boundaries."],
        },
        // Pre-closing
        BaselineTaskTemplate {
            key: "book-movers",
            title: "Book Movers",
            category: PreClosing,
            subcategory: Some(Subcategory::Moving),
            required: false,
            priority: Priority::Medium,
            schedule: ScheduleRule::from_closing(-14),
            dependencies: vec![],
            tags: vec!["moving"],
            guidance: vec!["Get written estimates and confirm insurance; end-of-month dates book early."],
        },
        BaselineTaskTemplate {
            key: "schedule-closing",
            title: "Schedule Closing Appointment",
            category: PreClosing,
            subcategory: None,
            required: true,
            priority: Priority::High,
            schedule: ScheduleRule::from_closing(-7),
            dependencies: vec!["open-escrow"],
            tags: vec!["closing"],
            guidance: vec!["Confirm time, location or remote signing, and who must attend."],
        },
        BaselineTaskTemplate {
            key: "transfer-utilities",
            title: "Transfer Utilities",
            category: PreClosing,
            subcategory: Some(Subcategory::Moving),
            required: true,
            priority: Priority::Medium,
            schedule: ScheduleRule::from_closing(-5),
            dependencies: vec![],
            tags: vec!["moving"],
            guidance: vec!["Start electric, gas, water, trash and internet in your name effective the closing date."],
        },
        BaselineTaskTemplate {
            key: "change-of-address",
            title: "Submit Change of Address",
            category: PreClosing,
            subcategory: Some(Subcategory::Moving),
            required: false,
            priority: Priority::Low,
            schedule: ScheduleRule::from_closing(-3),
            dependencies: vec![],
            tags: vec!["moving"],
            guidance: vec!["Update the postal service, employer, banks and voter registration."],
        },
        BaselineTaskTemplate {
            key: "closing-funds",
            title: "Arrange Closing Funds",
            category: PreClosing,
            subcategory: None,
            required: true,
            priority: Priority::High,
            schedule: ScheduleRule::from_closing(-2),
            dependencies: vec!["organize-funds"],
            tags: vec!["funds", "closing"],
            guidance: vec![
                "Get the final cash-to-close figure from the closing agent.",
                "Banks cap daily wires; start the transfer a day early.",
            ],
        },
        BaselineTaskTemplate {
            key: "gather-closing-documents",
            title: "Gather ID and Closing Documents",
            category: PreClosing,
            subcategory: None,
            required: true,
            priority: Priority::Medium,
            schedule: ScheduleRule::from_closing(-1),
            dependencies: vec!["schedule-closing"],
            tags: vec!["closing"],
            guidance: vec!["Bring government photo ID for every signer and any documents the closing agent requested."],
        },
        BaselineTaskTemplate {
            key: "final-walkthrough",
            title: "Final Walkthrough",
            category: PreClosing,
            subcategory: Some(Subcategory::Walkthrough),
            required: true,
            priority: Priority::High,
            schedule: ScheduleRule::from_closing(-1),
            dependencies: vec!["repair-negotiation"],
            tags: vec!["walkthrough"],
            guidance: vec![
                "Confirm agreed repairs are finished, included items are present, and nothing was damaged during move-out.",
                "Run every faucet, appliance and HVAC mode.",
            ],
        },
        // Closing
        BaselineTaskTemplate {
            key: "attend-closing",
            title: "Attend Closing and Sign Documents",
            category: Closing,
            subcategory: None,
            required: true,
            priority: Priority::High,
            schedule: ScheduleRule::from_closing(0),
            dependencies: vec!["final-walkthrough", "schedule-closing", "closing-funds"],
            tags: vec!["closing"],
            guidance: vec!["Read before signing; ask the closing agent to explain anything that does not match what you agreed."],
        },
        BaselineTaskTemplate {
            key: "receive-keys",
            title: "Receive Keys and Access Codes",
            category: Closing,
            subcategory: None,
            required: true,
            priority: Priority::High,
            schedule: ScheduleRule::from_closing(0),
            dependencies: vec!["attend-closing"],
            tags: vec!["closing"],
            guidance: vec!["Collect every key, garage remote, mailbox key and alarm or smart-lock code."],
        },
        BaselineTaskTemplate {
            key: "deed-recording",
            title: "Confirm Deed Recorded",
            category: Closing,
            subcategory: Some(Subcategory::Title),
            required: true,
            priority: Priority::Medium,
            schedule: ScheduleRule::from_closing(3),
            dependencies: vec!["attend-closing"],
            tags: vec!["title", "records"],
            guidance: vec!["Check the county recorder's site or ask the title company for the recording number."],
        },
        // Post-closing
        BaselineTaskTemplate {
            key: "change-locks",
            title: "Change Locks",
            category: PostClosing,
            subcategory: None,
            required: true,
            priority: Priority::High,
            schedule: ScheduleRule::from_closing(1),
            dependencies: vec!["receive-keys"],
            tags: vec!["security"],
            guidance: vec!["Rekey exterior doors and reset garage and alarm codes."],
        },
        BaselineTaskTemplate {
            key: "store-closing-documents",
            title: "Store Closing Documents",
            category: PostClosing,
            subcategory: None,
            required: false,
            priority: Priority::Low,
            schedule: ScheduleRule::from_closing(7),
            dependencies: vec!["attend-closing"],
            tags: vec!["records"],
            guidance: vec!["Keep the settlement statement, deed and note together; you need them for taxes and a future sale."],
        },
        BaselineTaskTemplate {
            key: "property-tax-calendar",
            title: "Calendar Property Tax Due Dates",
            category: PostClosing,
            subcategory: None,
            required: false,
            priority: Priority::Medium,
            schedule: ScheduleRule::from_closing(14),
            dependencies: vec!["property-taxes"],
            tags: vec!["taxes"],
            guidance: vec!["If taxes are not escrowed, note each installment and the payment method."],
        },
        BaselineTaskTemplate {
            key: "homestead-exemption",
            title: "File Homestead Exemption",
            category: PostClosing,
            subcategory: None,
            required: false,
            priority: Priority::Medium,
            schedule: ScheduleRule::from_closing(30),
            dependencies: vec!["deed-recording"],
            tags: vec!["taxes"],
            guidance: vec!["Most counties require filing by a fixed annual deadline to get the reduction."],
        },
        BaselineTaskTemplate {
            key: "maintenance-plan",
            title: "Set Up Maintenance Schedule",
            category: PostClosing,
            subcategory: None,
            required: false,
            priority: Priority::Low,
            schedule: ScheduleRule::from_closing(30),
            dependencies: vec!["receive-keys"],
            tags: vec!["maintenance"],
            guidance: vec!["Note filter changes, gutter cleaning, HVAC service and smoke detector tests."],
        },
        BaselineTaskTemplate {
            key: "owner-title-policy",
            title: "Receive Owner's Title Policy",
            category: PostClosing,
            subcategory: Some(Subcategory::Title),
            required: false,
            priority: Priority::Medium,
            schedule: ScheduleRule::from_closing(45),
            dependencies: vec!["deed-recording"],
            tags: vec!["title", "records"],
            guidance: vec!["The final policy usually arrives weeks after closing; follow up if it does not."],
        },
    ]
}
