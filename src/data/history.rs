use crate::data::snapshot::{Channel, Readings};
use std::collections::VecDeque;

pub const DEFAULT_CAPACITY: usize = 200;

/// Fixed-capacity sample history per tracked channel.
///
/// Series are kept in tracking order, which is also the export column order.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    capacity: usize,
    series: Vec<(Channel, VecDeque<f64>)>,
}

impl HistoryStore {
    pub fn new(channels: &[Channel], capacity: usize) -> Self {
        let mut store = Self {
            capacity: capacity.max(1),
            series: Vec::with_capacity(channels.len()),
        };
        for channel in channels {
            store.track(*channel);
        }
        store
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(&Channel::ALL, capacity)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Start tracking a channel. No-op if it is already tracked.
    pub fn track(&mut self, channel: Channel) {
        if self.series(channel).is_none() {
            self.series
                .push((channel, VecDeque::with_capacity(self.capacity)));
        }
    }

    pub fn push(&mut self, channel: Channel, value: f64) {
        let capacity = self.capacity;
        if let Some((_, queue)) = self.series.iter_mut().find(|(c, _)| *c == channel) {
            push_history_point(queue, value, capacity);
        }
    }

    /// Append one sample to every tracked series, whichever one is on screen.
    pub fn record(&mut self, readings: &Readings) {
        let channels: Vec<Channel> = self.channels().collect();
        for channel in channels {
            self.push(channel, readings.get(channel));
        }
    }

    pub fn clear(&mut self) {
        for (_, queue) in &mut self.series {
            queue.clear();
        }
    }

    pub fn series(&self, channel: Channel) -> Option<&VecDeque<f64>> {
        self.series
            .iter()
            .find(|(c, _)| *c == channel)
            .map(|(_, queue)| queue)
    }

    pub fn channels(&self) -> impl Iterator<Item = Channel> + '_ {
        self.series.iter().map(|(c, _)| *c)
    }

    /// True when no series holds a single sample.
    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|(_, queue)| queue.is_empty())
    }

    /// Number of rows in which every series has a sample.
    pub fn aligned_len(&self) -> usize {
        self.series
            .iter()
            .map(|(_, queue)| queue.len())
            .min()
            .unwrap_or(0)
    }

    /// Row `i` holds the `i`-th sample of every series, in tracking order.
    pub fn rows(&self) -> impl Iterator<Item = Vec<f64>> + '_ {
        (0..self.aligned_len()).map(move |i| {
            self.series
                .iter()
                .map(|(_, queue)| queue[i])
                .collect()
        })
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

fn push_history_point(queue: &mut VecDeque<f64>, value: f64, capacity: usize) {
    queue.push_back(value);
    while queue.len() > capacity {
        queue.pop_front();
    }
}
