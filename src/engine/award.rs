use crate::entities::Bid;

/// Selects the bid whose amount is closest to the arithmetic mean of all
/// bid amounts.
///
/// Distances are compared as `|n * amount - sum|` in 128-bit integers,
/// which is the mean distance scaled by the (constant) bid count. No
/// division happens, so cent amounts never round and equidistance ties are
/// exact. Ties go to the earliest submission, then to the smallest bid id,
/// making the selection total and independent of listing order.
pub fn select_winner(bids: &[Bid]) -> Option<&Bid> {
    let n = bids.len() as i128;
    let sum: i128 = bids.iter().map(|bid| bid.amount as i128).sum();

    bids.iter().min_by_key(|bid| {
        let distance = (n * bid.amount as i128 - sum).abs();
        (distance, bid.submitted_at, bid.id)
    })
}
