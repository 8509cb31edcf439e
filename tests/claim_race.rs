use std::sync::Arc;
use std::thread;

use chrono::Utc;
use uuid::Uuid;

use order_dispatch::config::Config;
use order_dispatch::engine::claim::claim_order;
use order_dispatch::engine::lifecycle::{self, NewOrder};
use order_dispatch::error::AppError;
use order_dispatch::models::actor::{Actor, ActorRole};
use order_dispatch::models::order::{OrderItem, OrderStatus};
use order_dispatch::models::partner::PartnerProfile;
use order_dispatch::models::wallet::WalletOwner;
use order_dispatch::state::AppState;

fn test_state() -> Arc<AppState> {
    Arc::new(AppState::new(&Config {
        http_port: 0,
        log_level: "info".to_string(),
        event_buffer_size: 256,
        queue_ttl_secs: 1800,
        presence_ttl_secs: 300,
    }))
}

fn seed_partner(state: &AppState, name: &str) -> Uuid {
    let profile = PartnerProfile {
        id: Uuid::new_v4(),
        name: name.to_string(),
        phone: "+91-90000-00000".to_string(),
        rating: 4.5,
        total_ratings: 12,
        vehicle_type: Some("bike".to_string()),
        vehicle_number: None,
        created_at: Utc::now(),
    };
    let id = profile.id;
    state.partners.insert(id, profile);
    id
}

fn seed_ready_order(state: &AppState, restaurant_id: Uuid) -> Uuid {
    let order = lifecycle::create_order(
        state,
        NewOrder {
            customer_id: Uuid::new_v4(),
            restaurant_id,
            items: vec![OrderItem {
                menu_item_id: Uuid::new_v4(),
                name: "Masala Dosa".to_string(),
                quantity: 2,
                unit_price: 400.0,
            }],
            address_id: None,
        },
    )
    .unwrap();

    let restaurant = Actor {
        role: ActorRole::Restaurant,
        id: restaurant_id,
    };
    lifecycle::transition_order(state, order.id, restaurant, OrderStatus::Accepted).unwrap();
    lifecycle::transition_order(state, order.id, restaurant, OrderStatus::ReadyForPickup).unwrap();
    order.id
}

#[test]
fn concurrent_claims_have_exactly_one_winner() {
    let state = test_state();
    let restaurant_id = Uuid::new_v4();
    let order_id = seed_ready_order(&state, restaurant_id);

    let partners: Vec<Uuid> = (0..8)
        .map(|n| seed_partner(&state, &format!("partner-{n}")))
        .collect();

    let handles: Vec<_> = partners
        .iter()
        .map(|partner_id| {
            let state = state.clone();
            let partner_id = *partner_id;
            thread::spawn(move || claim_order(&state, order_id, partner_id))
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    let winners: Vec<_> = results.iter().filter(|result| result.is_ok()).collect();
    assert_eq!(winners.len(), 1, "exactly one claim must win");

    for result in &results {
        match result {
            Ok(order) => {
                assert_eq!(order.status, OrderStatus::Assigned);
                assert!(order.delivery_partner_id.is_some());
            }
            Err(AppError::AlreadyAssigned) | Err(AppError::NotReady { .. }) => {}
            Err(other) => panic!("unexpected loser error: {other}"),
        }
    }

    let final_order = state.orders.get(&order_id).unwrap();
    assert_eq!(final_order.status, OrderStatus::Assigned);
    let assigned = final_order.delivery_partner_id.unwrap();
    assert!(partners.contains(&assigned));

    // The winning partner is the one the order remembers.
    let winner_order = winners[0].as_ref().unwrap();
    assert_eq!(winner_order.delivery_partner_id, Some(assigned));
}

#[test]
fn delivery_after_the_race_pays_the_winner_only() {
    let state = test_state();
    let restaurant_id = Uuid::new_v4();
    let order_id = seed_ready_order(&state, restaurant_id);

    let partners: Vec<Uuid> = (0..4)
        .map(|n| seed_partner(&state, &format!("partner-{n}")))
        .collect();

    let handles: Vec<_> = partners
        .iter()
        .map(|partner_id| {
            let state = state.clone();
            let partner_id = *partner_id;
            thread::spawn(move || claim_order(&state, order_id, partner_id))
        })
        .collect();
    for handle in handles {
        let _ = handle.join().unwrap();
    }

    let winner = state
        .orders
        .get(&order_id)
        .unwrap()
        .delivery_partner_id
        .unwrap();
    let actor = Actor {
        role: ActorRole::DeliveryPartner,
        id: winner,
    };

    lifecycle::transition_order(&state, order_id, actor, OrderStatus::AtRestaurant).unwrap();
    lifecycle::transition_order(&state, order_id, actor, OrderStatus::PickedUp).unwrap();
    let delivered =
        lifecycle::transition_order(&state, order_id, actor, OrderStatus::Delivered).unwrap();

    let winner_wallet = state.wallets.wallet(WalletOwner::DeliveryPartner(winner));
    assert_eq!(winner_wallet.transactions.len(), 1);
    assert!((winner_wallet.balance - delivered.delivery_fee).abs() < 1e-9);
    assert!((winner_wallet.balance - winner_wallet.ledger_sum()).abs() < 1e-9);

    for loser in partners.iter().filter(|id| **id != winner) {
        let wallet = state.wallets.wallet(WalletOwner::DeliveryPartner(*loser));
        assert!(wallet.transactions.is_empty());
    }
}
