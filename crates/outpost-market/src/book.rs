//! Book assembly: effective seller pricing with distance premiums.

use rust_decimal::Decimal;

use outpost_types::{Offer, WorldPos};

/// Premium added to a seller's ask per tile of distance from the buyer's
/// requested location, when both sides post locations in the same room.
fn premium_per_tile() -> Decimal {
    Decimal::new(1, 4) // 0.0001
}

/// Flat distance assumed when seller and buyer locations sit in different
/// rooms (a room crossing's worth of tiles).
const CROSS_ROOM_TILES: u32 = 50;

/// The price a buyer effectively pays a given seller: the base ask plus a
/// distance premium when the buyer cares where delivery happens.
///
/// The premium orders sellers only -- the transacted price still derives
/// from the base ask (`max(ask, bid)`), so a nearby expensive seller can
/// lose to a distant cheap one but never changes what the buyer pays.
pub fn effective_ask(seller: &Offer, buyer_location: Option<&WorldPos>) -> Decimal {
    let (Some(want), Some(have)) = (buyer_location, seller.location.as_ref()) else {
        return seller.price;
    };
    let tiles = want.chebyshev(have).unwrap_or(CROSS_ROOM_TILES);
    seller.price + premium_per_tile() * Decimal::from(tiles)
}

#[cfg(test)]
mod tests {
    use outpost_types::{Commodity, CorpId};
    use rust_decimal_macros::dec;

    use super::*;

    fn seller_at(price: Decimal, pos: WorldPos) -> Offer {
        Offer::sell(CorpId::from("s"), Commodity::Energy, 100, price, 50).at(pos)
    }

    #[test]
    fn no_location_means_no_premium() {
        let offer = Offer::sell(CorpId::from("s"), Commodity::Energy, 100, dec!(0.10), 50);
        assert_eq!(effective_ask(&offer, None), dec!(0.10));
        let near = WorldPos::new("W1N1", 5, 5);
        assert_eq!(effective_ask(&offer, Some(&near)), dec!(0.10));
    }

    #[test]
    fn nearby_sellers_price_ahead_of_distant_ones() {
        let buyer_at = WorldPos::new("W1N1", 10, 10);
        let near = seller_at(dec!(0.10), WorldPos::new("W1N1", 12, 10));
        let far = seller_at(dec!(0.10), WorldPos::new("W1N1", 40, 10));
        assert!(effective_ask(&near, Some(&buyer_at)) < effective_ask(&far, Some(&buyer_at)));
        assert_eq!(effective_ask(&near, Some(&buyer_at)), dec!(0.1002));
    }

    #[test]
    fn cross_room_distance_uses_the_flat_estimate() {
        let buyer_at = WorldPos::new("W1N1", 10, 10);
        let other_room = seller_at(dec!(0.10), WorldPos::new("W2N1", 10, 10));
        assert_eq!(effective_ask(&other_room, Some(&buyer_at)), dec!(0.1050));
    }
}
